//! Skill packages: parsing, resolution and export.
//!
//! A package is a primary `SKILL.md` plus optional reference files whose
//! directory decides the zone they land in, and an optional
//! `context-map.yaml` splitting the package into ordered steps.
//!
//! # Layout
//!
//! ```text
//! my-skill/
//! ├── SKILL.md                  (required: name, description, body)
//! ├── context-map.yaml          (optional: steps + depends_on)
//! └── references/
//!     ├── permanent/rules.md    → Permanent
//!     ├── stable/guide.md       → Stable
//!     ├── working/outline.md    → Working
//!     └── persona.md            → Stable (default)
//! ```
//!
//! # Pipeline
//!
//! ```text
//! PackageFiles ──▶ resolve_directory ──▶ ResolvedPackage
//!      │
//!      └──▶ resolve_context_map ──▶ Vec<ContextMapContext> (dependency order)
//! ```

mod context_map;
mod directory;
mod document;
mod export;
mod package;
mod title;

pub use context_map::{ContextMapContext, resolve_context_map};
pub use directory::{ReferenceFile, ResolvedPackage, filename_from_path, resolve_directory, zone_from_path};
pub use document::{SkillDocument, SkillMetadata, parse_document};
pub use export::{ExportStep, PackageExporter, export_project, export_session};
pub use package::{CONTEXT_MAP_FILE, PackageFiles};
pub use title::{TitleRules, extract_title, sanitize_filename, unique_filename};

use std::path::Path;

/// Read a package directory from disk.
pub fn load_package_dir(path: &Path) -> Result<PackageFiles, contextforge_core::PackageError> {
    PackageFiles::load_dir(path)
}
