//! Error types for the ContextForge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each component has its own error enum; messages name the offending
//! key, path or id so callers can show them to end users directly.

use thiserror::Error;

/// The top-level error type for all ContextForge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Document parse errors ---
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    // --- Package structure errors ---
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    // --- Context-map errors ---
    #[error("Context map error: {0}")]
    ContextMap(#[from] ContextMapError),

    // --- Import orchestration errors ---
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    // --- Store collaborator errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Block validation errors ---
    #[error("Block error: {0}")]
    Block(#[from] BlockError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Format errors raised while parsing a primary document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Not a valid SKILL.md: missing frontmatter (expected --- at start)")]
    MissingFrontmatter,

    #[error("Not a valid SKILL.md: missing closing --- delimiter")]
    MissingClosingDelimiter,

    #[error("Not a valid SKILL.md: missing required 'name' field in frontmatter")]
    MissingName,
}

/// Structure errors raised while resolving a package.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("No SKILL.md found in package")]
    NoPrimaryDocument,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Failed to read package file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to encode package file {path}: {reason}")]
    Encode { path: String, reason: String },
}

/// Errors raised while validating and ordering a context map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextMapError {
    #[error("Invalid context map syntax: {0}")]
    InvalidSyntax(String),

    #[error("Missing 'contexts' key in context map")]
    MissingContexts,

    #[error("'contexts' must be a mapping of keys to context definitions")]
    ContextsNotMapping,

    #[error("Context map must define at least one context")]
    EmptyContexts,

    #[error("Context '{key}' is invalid: {reason}")]
    InvalidContext { key: String, reason: String },

    #[error("Context '{key}' is missing required 'label' field")]
    MissingLabel { key: String },

    #[error("Referenced file not found in package: {path}")]
    FileNotFound { path: String },

    #[error("Context '{key}' depends on unknown context '{dependency}'")]
    UnknownDependency { key: String, dependency: String },

    #[error("Circular dependency detected involving context: {key}")]
    CircularDependency { key: String },
}

/// Precondition errors raised by the import orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("No contexts provided for multi-context import")]
    NoContexts,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session {0} is not part of a project")]
    NotInProject(String),

    #[error("Workflow has no step after step {current} (of {total})")]
    NoNextStep { current: usize, total: usize },

    #[error("Session {session} is step {step} but the project is at step {current}")]
    StaleStep {
        session: String,
        step: usize,
        current: usize,
    },
}

/// Errors surfaced by a [`SessionStore`](crate::store::SessionStore) implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("Invalid block type '{0}': expected lowercase letters, digits, '_' or '-'")]
    InvalidType(String),
}
