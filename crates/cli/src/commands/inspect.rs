//! `contextforge inspect` - Show how a package directory resolves.

use super::print_json;
use contextforge_skills::{
    ContextMapContext, ResolvedPackage, load_package_dir, resolve_context_map, resolve_directory,
};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Inspection {
    #[serde(flatten)]
    package: ResolvedPackage,
    /// Contexts in dependency order; absent without a context map.
    #[serde(skip_serializing_if = "Option::is_none")]
    contexts: Option<Vec<ContextMapContext>>,
}

pub async fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let files = load_package_dir(dir)?;
    let package = resolve_directory(&files, dir_name(dir))?;
    let contexts = files
        .context_map()
        .map(|map| resolve_context_map(map, &files.paths()))
        .transpose()?;

    tracing::info!(
        skill = %package.document.metadata.skill_name,
        references = package.references.len(),
        contexts = contexts.as_ref().map_or(0, Vec::len),
        "Resolved package"
    );
    print_json(&Inspection { package, contexts })
}

/// Final path component, used as the fallback skill name.
pub fn dir_name(dir: &Path) -> Option<&str> {
    dir.file_name().and_then(|name| name.to_str())
}
