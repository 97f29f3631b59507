//! `contextforge import` - Run the import orchestrator on a package
//! directory against a fresh in-memory store.

use super::inspect::dir_name;
use super::print_json;
use chrono::{DateTime, Utc};
use contextforge_config::AppConfig;
use contextforge_core::{Block, SessionStore};
use contextforge_skills::load_package_dir;
use contextforge_store::InMemoryStore;
use contextforge_workflow::{ImportOptions, PackageImport, SourceInfo, WorkflowEngine};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport {
    session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_name: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    outcome: PackageImport,
    blocks: Vec<Block>,
}

pub async fn run(dir: &Path, session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let files = load_package_dir(dir)?;

    let store = Arc::new(InMemoryStore::new());
    let session_id = store.create_session(session).await?;
    let engine = WorkflowEngine::new(store.clone(), ImportOptions::from(&config.import));

    let source = SourceInfo::new(config.import.source, Some(dir.display().to_string()));
    let outcome = engine
        .import_package(&session_id, &files, dir_name(dir), &source)
        .await?;

    let blocks = store.list_blocks(&session_id).await?;
    tracing::info!(session = %session_id, blocks = blocks.len(), "Import complete");
    print_json(&ImportReport {
        session_name: store.session_name(&session_id).await,
        updated_at: store.session_updated_at(&session_id).await,
        session_id,
        outcome,
        blocks,
    })
}
