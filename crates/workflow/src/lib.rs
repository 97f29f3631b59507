//! Workflow engine - package import orchestration and step materialization.
//!
//! Importing a package with a context map produces:
//!
//! 1. The skill block and the first context's files in the current session
//! 2. A template for each remaining context
//! 3. A workflow with one step per context (carry forward Permanent + Working)
//! 4. A project wrapping the workflow, with the current session as step 0
//!
//! Planning ([`plan_project_import`], [`plan_skill_import`]) is pure; the
//! [`WorkflowEngine`] persists plans through a
//! [`SessionStore`](contextforge_core::SessionStore) and advances projects
//! from one step's session to the next.

pub mod engine;
pub mod materialize;
pub mod plan;

pub use engine::{
    PackageImport, ProjectImportOutcome, SkillImportOutcome, StepOutcome, WorkflowEngine,
};
pub use materialize::materialize_step;
pub use plan::{
    ImportOptions, ProjectImportPlan, SkillImportPlan, SourceInfo, plan_project_import,
    plan_skill_import,
};
