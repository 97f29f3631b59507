//! SessionStore trait - the persistence collaborator.
//!
//! The engine never persists anything itself. Import plans, templates,
//! workflows and projects are handed to a store, which also owns
//! position assignment: appending a block reads the last position in the
//! `(session, zone)` pair and writes `last + 1` as one serialized step.

use crate::block::Block;
use crate::error::StoreError;
use crate::workflow::{Project, Template, Workflow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A session's project linkage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBinding {
    pub project_id: Option<String>,
    pub step_number: Option<usize>,
}

/// The core SessionStore trait.
///
/// Implementations: in-memory (for testing and the CLI); real deployments
/// plug in their own database.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Create an empty session and return its id.
    async fn create_session(&self, name: Option<String>) -> Result<String, StoreError>;

    /// Whether a session exists.
    async fn has_session(&self, session_id: &str) -> Result<bool, StoreError>;

    /// Append a block at the end of its zone. The store assigns the id and
    /// the position (`last position in zone + 1`, or 0) and returns the
    /// stored block.
    async fn append_block(&self, session_id: &str, block: Block) -> Result<Block, StoreError>;

    /// Insert a block keeping its position. The store assigns the id.
    async fn insert_block(&self, session_id: &str, block: Block) -> Result<Block, StoreError>;

    /// All blocks of a session, in no particular order.
    async fn list_blocks(&self, session_id: &str) -> Result<Vec<Block>, StoreError>;

    async fn insert_template(&self, template: Template) -> Result<String, StoreError>;

    async fn get_template(&self, template_id: &str) -> Result<Option<Template>, StoreError>;

    async fn insert_workflow(&self, workflow: Workflow) -> Result<String, StoreError>;

    async fn get_workflow(&self, workflow_id: &str) -> Result<Option<Workflow>, StoreError>;

    async fn insert_project(&self, project: Project) -> Result<String, StoreError>;

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>, StoreError>;

    /// Replace a stored project (matched by id).
    async fn update_project(&self, project: Project) -> Result<(), StoreError>;

    /// Link a session to a project as the given step.
    async fn bind_session(
        &self,
        session_id: &str,
        project_id: &str,
        step_number: usize,
    ) -> Result<(), StoreError>;

    async fn session_binding(&self, session_id: &str) -> Result<SessionBinding, StoreError>;
}
