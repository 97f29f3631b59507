//! Context assembly for ContextForge.
//!
//! Composes a session's zoned blocks into the message list sent to a
//! language model, and reports how much of each zone's token budget the
//! session uses. Every function here is pure; callers hand in a snapshot
//! of blocks and get values back.
//!
//! # Zones (in assembly order)
//!
//! | Zone | Message | Typical content |
//! |------|---------|-----------------|
//! | Permanent | system | Persona, rules, the active system prompt |
//! | Stable | user, `Reference Material:` | Reference documents |
//! | Working | user, `Current Context:` | Notes for the current task |

pub mod assembler;
pub mod budget;
pub mod stats;
pub mod token;

pub use assembler::{
    AssembledContext, assemble, assemble_request, assemble_with_history, extract_system_prompt,
};
pub use budget::{BudgetReport, BudgetUsage, budget_report};
pub use stats::{ContextStats, ZoneStat, context_stats};
pub use token::{estimate_message_tokens, estimate_messages_tokens};
