//! Workflow engine: persists import plans and advances projects.

use crate::materialize::materialize_step;
use crate::plan::{
    ImportOptions, ProjectImportPlan, SkillImportPlan, SourceInfo, plan_project_import,
    plan_skill_import,
};
use contextforge_core::{Error, ImportError, Result, SessionStore, StoreError};
use contextforge_skills::{PackageFiles, resolve_context_map, resolve_directory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Ids produced by a single-session import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillImportOutcome {
    pub skill_block_id: String,
    pub reference_block_ids: Vec<String>,
}

/// Ids produced by a multi-context import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectImportOutcome {
    pub project_id: String,
    pub workflow_id: String,
    pub template_ids: Vec<String>,
    pub template_count: usize,
}

/// Result of importing a package as found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackageImport {
    Skill(SkillImportOutcome),
    Project(ProjectImportOutcome),
}

/// The session created for a project's next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub session_id: String,
    pub step_number: usize,
    pub block_count: usize,
}

/// Applies import plans and workflow transitions to a [`SessionStore`].
pub struct WorkflowEngine {
    store: Arc<dyn SessionStore>,
    options: ImportOptions,
}

impl WorkflowEngine {
    pub fn new(store: Arc<dyn SessionStore>, options: ImportOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Resolve and import a package into `session_id`.
    ///
    /// Packages with a `context-map.yaml` become a project; all others are
    /// imported into the session as a skill plus references.
    pub async fn import_package(
        &self,
        session_id: &str,
        files: &PackageFiles,
        fallback_name: Option<&str>,
        source: &SourceInfo,
    ) -> Result<PackageImport> {
        let package = resolve_directory(files, fallback_name)?;

        match files.context_map() {
            Some(map) => {
                let contexts = resolve_context_map(map, &files.paths())?;
                let plan = plan_project_import(
                    &package.document,
                    &contexts,
                    files,
                    source,
                    self.options,
                )?;
                Ok(PackageImport::Project(self.import_project(session_id, plan).await?))
            }
            None => {
                let plan = plan_skill_import(&package, source, self.options);
                Ok(PackageImport::Skill(self.import_skill(session_id, plan).await?))
            }
        }
    }

    /// Append a skill and its references to a session.
    pub async fn import_skill(
        &self,
        session_id: &str,
        plan: SkillImportPlan,
    ) -> Result<SkillImportOutcome> {
        self.require_session(session_id).await?;

        let skill = self.store.append_block(session_id, plan.skill_block).await?;
        let mut reference_block_ids = Vec::with_capacity(plan.reference_blocks.len());
        for block in plan.reference_blocks {
            reference_block_ids.push(self.store.append_block(session_id, block).await?.id);
        }

        info!(
            session = %session_id,
            references = reference_block_ids.len(),
            "Imported skill package"
        );
        Ok(SkillImportOutcome {
            skill_block_id: skill.id,
            reference_block_ids,
        })
    }

    /// Persist a multi-context plan and bind `session_id` as step 0.
    ///
    /// Templates, workflow and project are written before the session is
    /// touched. The store has no transactions: a failure partway leaves the
    /// records written so far, and a failure while appending leaves the
    /// blocks already appended.
    pub async fn import_project(
        &self,
        session_id: &str,
        plan: ProjectImportPlan,
    ) -> Result<ProjectImportOutcome> {
        self.require_session(session_id).await?;

        let ProjectImportPlan {
            skill_block,
            session_blocks,
            templates,
            mut workflow,
            mut project,
        } = plan;

        let mut template_ids = Vec::with_capacity(templates.len());
        for template in templates {
            template_ids.push(self.store.insert_template(template).await?);
        }

        // Step 0 is the live session; step i uses template i - 1.
        for (step, template_id) in workflow.steps.iter_mut().skip(1).zip(&template_ids) {
            step.template_id = Some(template_id.clone());
        }

        let workflow_id = self.store.insert_workflow(workflow).await?;
        project.workflow_id = Some(workflow_id.clone());
        let project_id = self.store.insert_project(project).await?;

        self.store.append_block(session_id, skill_block).await?;
        for block in session_blocks {
            self.store.append_block(session_id, block).await?;
        }
        self.store.bind_session(session_id, &project_id, 0).await?;

        info!(
            session = %session_id,
            project = %project_id,
            templates = template_ids.len(),
            "Imported skill package as project"
        );
        Ok(ProjectImportOutcome {
            project_id,
            workflow_id,
            template_count: template_ids.len(),
            template_ids,
        })
    }

    /// Create the session for the step after `session_id`'s step.
    ///
    /// Carried blocks come from `session_id`; the step's template (if any)
    /// is appended. The project's current step moves forward. Only the
    /// session of the project's current step can advance.
    pub async fn advance(&self, session_id: &str) -> Result<StepOutcome> {
        let binding = self.store.session_binding(session_id).await?;
        let (Some(project_id), Some(step_number)) = (binding.project_id, binding.step_number) else {
            return Err(ImportError::NotInProject(session_id.to_string()).into());
        };

        let mut project = self
            .store
            .get_project(&project_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("project {project_id}")))?;
        let workflow_id = project
            .workflow_id
            .clone()
            .ok_or_else(|| ImportError::NotInProject(session_id.to_string()))?;
        let workflow = self
            .store
            .get_workflow(&workflow_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("workflow {workflow_id}")))?;

        if step_number != project.current_step {
            return Err(ImportError::StaleStep {
                session: session_id.to_string(),
                step: step_number,
                current: project.current_step,
            }
            .into());
        }
        let next = project.advance(&workflow)?;
        let step = workflow
            .steps
            .get(next)
            .ok_or_else(|| Error::Internal(format!("workflow {workflow_id} lost step {next}")))?;

        let template = match &step.template_id {
            Some(id) => Some(
                self.store
                    .get_template(id)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("template {id}")))?,
            ),
            None => None,
        };

        let previous = self.store.list_blocks(session_id).await?;
        let blocks = materialize_step(&previous, step, template.as_ref());
        let block_count = blocks.len();

        let next_session = self.store.create_session(Some(step.name.clone())).await?;
        for block in blocks {
            self.store.insert_block(&next_session, block).await?;
        }
        self.store.bind_session(&next_session, &project_id, next).await?;
        self.store.update_project(project).await?;

        debug!(
            from = %session_id,
            to = %next_session,
            step = next,
            blocks = block_count,
            "Advanced project"
        );
        Ok(StepOutcome {
            session_id: next_session,
            step_number: next,
            block_count,
        })
    }

    async fn require_session(&self, session_id: &str) -> Result<()> {
        if self.store.has_session(session_id).await? {
            Ok(())
        } else {
            Err(ImportError::SessionNotFound(session_id.to_string()).into())
        }
    }
}
