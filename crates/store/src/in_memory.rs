//! In-memory store - useful for testing, the CLI and ephemeral sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contextforge_core::error::StoreError;
use contextforge_core::store::{SessionBinding, SessionStore};
use contextforge_core::{Block, Project, Template, Workflow};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Session {
    name: Option<String>,
    blocks: Vec<Block>,
    binding: SessionBinding,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    sessions: HashMap<String, Session>,
    templates: HashMap<String, Template>,
    workflows: HashMap<String, Workflow>,
    projects: HashMap<String, Project>,
}

/// A store that keeps everything in process memory.
///
/// One write lock covers each mutation, so position assignment in
/// [`SessionStore::append_block`] is serialized per store.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Session name given at creation.
    pub async fn session_name(&self, session_id: &str) -> Option<String> {
        let state = self.state.read().await;
        state.sessions.get(session_id).and_then(|s| s.name.clone())
    }

    /// Last time a session's blocks or binding changed.
    pub async fn session_updated_at(&self, session_id: &str) -> Option<DateTime<Utc>> {
        let state = self.state.read().await;
        state.sessions.get(session_id).map(|s| s.updated_at)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn session_mut<'a>(state: &'a mut State, session_id: &str) -> Result<&'a mut Session, StoreError> {
    state
        .sessions
        .get_mut(session_id)
        .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))
}

#[async_trait]
impl SessionStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn create_session(&self, name: Option<String>) -> Result<String, StoreError> {
        let id = new_id();
        let session = Session {
            name,
            blocks: Vec::new(),
            binding: SessionBinding::default(),
            updated_at: Utc::now(),
        };
        self.state.write().await.sessions.insert(id.clone(), session);
        tracing::debug!(session = %id, "Created session");
        Ok(id)
    }

    async fn has_session(&self, session_id: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.sessions.contains_key(session_id))
    }

    async fn append_block(&self, session_id: &str, mut block: Block) -> Result<Block, StoreError> {
        let mut state = self.state.write().await;
        let session = session_mut(&mut state, session_id)?;

        let last = session
            .blocks
            .iter()
            .filter(|b| b.zone == block.zone)
            .map(|b| b.position)
            .max_by(|a, b| a.total_cmp(b));
        block.position = last.map_or(0.0, |p| p + 1.0);
        if block.id.is_empty() {
            block.id = new_id();
        }

        session.blocks.push(block.clone());
        session.updated_at = Utc::now();
        Ok(block)
    }

    async fn insert_block(&self, session_id: &str, mut block: Block) -> Result<Block, StoreError> {
        let mut state = self.state.write().await;
        let session = session_mut(&mut state, session_id)?;
        if block.id.is_empty() {
            block.id = new_id();
        }
        session.blocks.push(block.clone());
        session.updated_at = Utc::now();
        Ok(block)
    }

    async fn list_blocks(&self, session_id: &str) -> Result<Vec<Block>, StoreError> {
        let state = self.state.read().await;
        state
            .sessions
            .get(session_id)
            .map(|s| s.blocks.clone())
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))
    }

    async fn insert_template(&self, mut template: Template) -> Result<String, StoreError> {
        if template.id.is_empty() {
            template.id = new_id();
        }
        let id = template.id.clone();
        self.state.write().await.templates.insert(id.clone(), template);
        Ok(id)
    }

    async fn get_template(&self, template_id: &str) -> Result<Option<Template>, StoreError> {
        Ok(self.state.read().await.templates.get(template_id).cloned())
    }

    async fn insert_workflow(&self, mut workflow: Workflow) -> Result<String, StoreError> {
        if workflow.id.is_empty() {
            workflow.id = new_id();
        }
        let id = workflow.id.clone();
        self.state.write().await.workflows.insert(id.clone(), workflow);
        Ok(id)
    }

    async fn get_workflow(&self, workflow_id: &str) -> Result<Option<Workflow>, StoreError> {
        Ok(self.state.read().await.workflows.get(workflow_id).cloned())
    }

    async fn insert_project(&self, mut project: Project) -> Result<String, StoreError> {
        if project.id.is_empty() {
            project.id = new_id();
        }
        let id = project.id.clone();
        self.state.write().await.projects.insert(id.clone(), project);
        Ok(id)
    }

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.state.read().await.projects.get(project_id).cloned())
    }

    async fn update_project(&self, project: Project) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        match state.projects.get_mut(&project.id) {
            Some(existing) => {
                *existing = project;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("project {}", project.id))),
        }
    }

    async fn bind_session(
        &self,
        session_id: &str,
        project_id: &str,
        step_number: usize,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let session = session_mut(&mut state, session_id)?;
        session.binding = SessionBinding {
            project_id: Some(project_id.to_string()),
            step_number: Some(step_number),
        };
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn session_binding(&self, session_id: &str) -> Result<SessionBinding, StoreError> {
        let state = self.state.read().await;
        state
            .sessions
            .get(session_id)
            .map(|s| s.binding.clone())
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))
    }
}
