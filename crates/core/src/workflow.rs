//! Workflow, step, project and template records.
//!
//! A workflow is an ordered chain of steps; each step maps 1:1 to a session.
//! A project wraps one workflow instance and tracks the current step.

use crate::block::{Block, BlockMetadata, BlockType};
use crate::error::ImportError;
use crate::zone::{DEFAULT_CARRY_FORWARD, Zone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A block snapshot stored inside a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBlock {
    pub content: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub zone: Zone,
    pub position: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BlockMetadata>,
}

impl TemplateBlock {
    /// Materialize as a fresh (unsaved) block.
    pub fn to_block(&self) -> Block {
        let block = Block::new(
            self.content.clone(),
            self.block_type.clone(),
            self.zone,
            self.position,
        );
        match &self.metadata {
            Some(meta) => block.with_metadata(meta.clone()),
            None => block,
        }
    }
}

impl From<&Block> for TemplateBlock {
    fn from(block: &Block) -> Self {
        Self {
            content: block.content.clone(),
            block_type: block.block_type.clone(),
            zone: block.zone,
            position: block.position,
            metadata: block.metadata.clone(),
        }
    }
}

/// A reusable, position-ordered snapshot of blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub blocks: Vec<TemplateBlock>,
    pub created_at: DateTime<Utc>,
}

impl Template {
    pub fn new(name: impl Into<String>, description: Option<String>, blocks: Vec<TemplateBlock>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description,
            blocks,
            created_at: Utc::now(),
        }
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Template applied when the step's session is created. Step 0 of an
    /// imported workflow has none: it is the already-live session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_forward_zones: Option<Vec<Zone>>,
}

impl Step {
    /// Zones copied from the previous step; Permanent + Working when unset.
    pub fn carry_forward_zones(&self) -> Vec<Zone> {
        self.carry_forward_zones
            .clone()
            .unwrap_or_else(|| DEFAULT_CARRY_FORWARD.to_vec())
    }
}

/// An ordered list of steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, description: Option<String>, steps: Vec<Step>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description,
            steps,
            created_at: Utc::now(),
        }
    }
}

/// A workflow instance tracking which step is current.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    pub current_step: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: Option<String>, workflow_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: name.into(),
            description,
            workflow_id,
            current_step: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to the next step of `workflow`, returning the new index.
    pub fn advance(&mut self, workflow: &Workflow) -> Result<usize, ImportError> {
        let next = self.current_step + 1;
        if next >= workflow.steps.len() {
            return Err(ImportError::NoNextStep {
                current: self.current_step,
                total: workflow.steps.len(),
            });
        }
        self.current_step = next;
        self.updated_at = Utc::now();
        Ok(next)
    }
}
