//! # ContextForge Core
//!
//! Domain types, traits, and error definitions for ContextForge: zoned
//! blocks, prompt messages, workflow records and the store collaborator.
//! This crate has **no framework dependencies**. It defines the domain
//! model every other crate builds on.
//!
//! ## Design Philosophy
//!
//! Parsing, resolution and assembly are pure functions over these types.
//! Persistence is a trait ([`SessionStore`]) so the engine stays stateless
//! and any storage layer can sit behind it.

pub mod block;
pub mod error;
pub mod message;
pub mod store;
pub mod workflow;
pub mod zone;

// Re-export key types at crate root for ergonomics
pub use block::{Block, BlockMetadata, BlockRecord, BlockType, SourceKind, blocks_from_records};
pub use error::{
    BlockError, ContextMapError, DocumentError, Error, ImportError, PackageError, Result,
    StoreError,
};
pub use message::{ContextMessage, ConversationTurn, Role, TurnRole, estimate_tokens};
pub use store::{SessionBinding, SessionStore};
pub use workflow::{Project, Step, Template, TemplateBlock, Workflow};
pub use zone::{DEFAULT_CARRY_FORWARD, DEFAULT_TOTAL_BUDGET, Zone};
