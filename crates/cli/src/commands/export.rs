//! `contextforge export` - Write a block snapshot as a package directory.

use super::read_blocks;
use contextforge_config::AppConfig;
use contextforge_skills::{PackageExporter, TitleRules};
use std::path::Path;

pub async fn run(
    blocks: &Path,
    out: &Path,
    name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let blocks = read_blocks(blocks)?;

    let fallback = name
        .or_else(|| out.file_name().and_then(|n| n.to_str()))
        .unwrap_or("exported-skill");
    let exporter = PackageExporter::new(TitleRules::from(&config.export));
    let files = exporter.export_session(&blocks, fallback);
    files.write_to(out)?;

    println!("✅ Wrote {} files to {}", files.len(), out.display());
    Ok(())
}
