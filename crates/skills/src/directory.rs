//! Directory resolver: locate `SKILL.md` and classify `references/` files.
//!
//! Zone mapping for reference files:
//!
//! | Path | Zone |
//! |------|------|
//! | `references/permanent/**` | Permanent |
//! | `references/stable/**` | Stable |
//! | `references/working/**` | Working |
//! | `references/*.md`, `references/<other>/**` | Stable (default) |

use crate::document::{SkillDocument, parse_document};
use crate::package::PackageFiles;
use contextforge_core::{PackageError, Zone};
use serde::{Deserialize, Serialize};

const PRIMARY_DOCUMENT: &str = "skill.md";
const REFERENCES_DIR: &str = "references/";

/// A secondary package file assigned to a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceFile {
    /// Last path segment.
    pub filename: String,
    pub content: String,
    pub zone: Zone,
    pub relative_path: String,
}

/// The primary document plus its classified references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub document: SkillDocument,
    /// Sorted by relative path.
    pub references: Vec<ReferenceFile>,
}

/// Resolve a package's primary document and reference files.
pub fn resolve_directory(
    files: &PackageFiles,
    fallback_name: Option<&str>,
) -> Result<ResolvedPackage, PackageError> {
    let (primary_path, primary_content) = files
        .iter()
        .find(|(path, _)| is_primary_document(path))
        .ok_or(PackageError::NoPrimaryDocument)?;

    let document = parse_document(primary_content, fallback_name)?;

    let mut references: Vec<ReferenceFile> = files
        .iter()
        .filter(|(path, _)| *path != primary_path)
        .filter(|(path, _)| {
            let lower = path.to_lowercase();
            lower.starts_with(REFERENCES_DIR) && lower.ends_with(".md")
        })
        .map(|(path, content)| ReferenceFile {
            filename: filename_from_path(path).to_string(),
            content: content.to_string(),
            zone: zone_from_path(path),
            relative_path: path.to_string(),
        })
        .collect();

    references.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    tracing::debug!(
        skill = %document.metadata.skill_name,
        references = references.len(),
        "Resolved package directory"
    );

    Ok(ResolvedPackage {
        document,
        references,
    })
}

/// `SKILL.md` (any case) outside the `references/` tree.
fn is_primary_document(path: &str) -> bool {
    filename_from_path(path).to_lowercase() == PRIMARY_DOCUMENT && !path.contains(REFERENCES_DIR)
}

/// Zone named by the segment right after `references/`; Stable otherwise.
pub fn zone_from_path(relative_path: &str) -> Zone {
    let lower = relative_path.to_lowercase();
    let Some(rest) = lower.strip_prefix(REFERENCES_DIR) else {
        return Zone::Stable;
    };
    match rest.split_once('/') {
        Some((segment, _)) => segment.parse().unwrap_or(Zone::Stable),
        None => Zone::Stable,
    }
}

/// Last `/`-separated segment of a path.
pub fn filename_from_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
