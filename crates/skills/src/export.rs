//! Package export: turn session blocks back into a skill package.
//!
//! A single session becomes `SKILL.md` plus `references/<zone>/*.md`. A
//! multi-step project additionally gets a `context-map.yaml` chaining one
//! context per step, so the result imports back into the same workflow.

use crate::package::{CONTEXT_MAP_FILE, PackageFiles};
use crate::title::TitleRules;
use contextforge_core::{Block, PackageError, Zone};
use serde_yaml::{Mapping, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const PRIMARY_DOCUMENT: &str = "SKILL.md";
const FALLBACK_DESCRIPTION: &str = "Exported from ContextForge";
const FALLBACK_BODY: &str = "This skill was exported from a ContextForge session.";

/// Blocks of one materialized workflow step.
#[derive(Debug, Clone, Default)]
pub struct ExportStep {
    /// Session name; `Step {n + 1}` when absent.
    pub name: Option<String>,
    pub step_number: usize,
    pub blocks: Vec<Block>,
}

impl ExportStep {
    fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Step {}", self.step_number + 1),
        }
    }
}

/// Writes sessions and projects out as packages.
#[derive(Debug, Clone, Default)]
pub struct PackageExporter {
    rules: TitleRules,
}

impl PackageExporter {
    pub fn new(rules: TitleRules) -> Self {
        Self { rules }
    }

    /// Export one session's blocks.
    pub fn export_session(&self, blocks: &[Block], fallback_name: &str) -> PackageFiles {
        let blocks = sorted(blocks.iter());
        let (skills, others): (Vec<&Block>, Vec<&Block>) =
            blocks.into_iter().partition(|b| b.block_type.is_skill());

        let mut files = PackageFiles::new();
        files.insert(PRIMARY_DOCUMENT, primary_document(skills.first().copied(), fallback_name));

        let mut used = HashSet::new();
        for (i, block) in others.iter().enumerate() {
            let path = self.reference_path(block, i, &mut used);
            files.insert(path, block.content.clone());
        }

        debug!(references = others.len(), "Exported session package");
        files
    }

    /// Export every step of a project, deduplicating identical content.
    pub fn export_project(
        &self,
        steps: &[ExportStep],
        project_name: &str,
    ) -> Result<PackageFiles, PackageError> {
        let mut files = PackageFiles::new();

        let first_skill = steps
            .iter()
            .flat_map(|step| sorted(step.blocks.iter()))
            .find(|b| b.block_type.is_skill());
        let fallback = if project_name.is_empty() {
            "Exported Project"
        } else {
            project_name
        };
        files.insert(PRIMARY_DOCUMENT, primary_document(first_skill, fallback));

        let mut written: HashMap<&str, String> = HashMap::new();
        let mut used_files = HashSet::new();
        let mut used_keys = HashSet::new();
        let mut contexts = Mapping::new();
        let mut previous_key: Option<String> = None;

        for step in steps {
            let mut zone_paths: HashMap<Zone, Vec<String>> = HashMap::new();
            let others = sorted(step.blocks.iter().filter(|b| !b.block_type.is_skill()));

            for (i, block) in others.into_iter().enumerate() {
                let path = match written.get(block.content.as_str()) {
                    Some(existing) => existing.clone(),
                    None => {
                        let path = self.reference_path(block, i, &mut used_files);
                        files.insert(path.clone(), block.content.clone());
                        written.insert(&block.content, path.clone());
                        path
                    }
                };
                zone_paths.entry(block.zone).or_default().push(path);
            }

            let label = step.label();
            let key = self
                .rules
                .unique_filename(&self.rules.sanitize_filename(&label), "", &used_keys);
            used_keys.insert(key.clone());

            let mut context = Mapping::new();
            context.insert("label".into(), label.into());
            for zone in Zone::ALL {
                if let Some(paths) = zone_paths.remove(&zone).filter(|p| !p.is_empty()) {
                    context.insert(zone.dir_name().into(), string_sequence(paths));
                }
            }
            if let Some(previous) = previous_key.replace(key.clone()) {
                context.insert("depends_on".into(), string_sequence(vec![previous]));
            }
            contexts.insert(key.into(), Value::Mapping(context));
        }

        let mut root = Mapping::new();
        root.insert("contexts".into(), Value::Mapping(contexts));
        let yaml = serde_yaml::to_string(&Value::Mapping(root)).map_err(|e| PackageError::Encode {
            path: CONTEXT_MAP_FILE.into(),
            reason: e.to_string(),
        })?;
        files.insert(CONTEXT_MAP_FILE, yaml);

        debug!(steps = steps.len(), files = files.len(), "Exported project package");
        Ok(files)
    }

    /// `references/<zone>/<unique name>.md` for a block; records the name in `used`.
    fn reference_path(&self, block: &Block, index: usize, used: &mut HashSet<String>) -> String {
        let skill_name = block
            .metadata
            .as_ref()
            .and_then(|m| m.skill_name.as_deref())
            .filter(|name| !name.is_empty());

        let base = match skill_name {
            Some(name) => self.rules.sanitize_filename(strip_md_extension(name)),
            None => {
                let title = self
                    .rules
                    .extract_title(&block.content, block.block_type.as_str(), index);
                self.rules.sanitize_filename(&title)
            }
        };

        let filename = self.rules.unique_filename(&base, ".md", used);
        used.insert(filename.clone());
        format!("references/{}/{filename}", block.zone.dir_name())
    }
}

/// Export a session with default title rules.
pub fn export_session(blocks: &[Block], fallback_name: &str) -> PackageFiles {
    PackageExporter::default().export_session(blocks, fallback_name)
}

/// Export a project with default title rules.
pub fn export_project(steps: &[ExportStep], project_name: &str) -> Result<PackageFiles, PackageError> {
    PackageExporter::default().export_project(steps, project_name)
}

fn sorted<'a>(blocks: impl Iterator<Item = &'a Block>) -> Vec<&'a Block> {
    let mut blocks: Vec<&Block> = blocks.collect();
    blocks.sort_by(|a, b| a.cmp_zone_position(b));
    blocks
}

fn primary_document(skill: Option<&Block>, fallback_name: &str) -> String {
    let Some(skill) = skill else {
        return format!(
            "---\nname: \"{}\"\ndescription: \"{FALLBACK_DESCRIPTION}\"\n---\n\n{FALLBACK_BODY}",
            header_value(fallback_name)
        );
    };

    let metadata = skill.metadata.as_ref();
    let name = metadata
        .and_then(|m| m.skill_name.as_deref())
        .filter(|n| !n.is_empty())
        .unwrap_or(fallback_name);
    let description = metadata
        .and_then(|m| m.skill_description.as_deref())
        .unwrap_or_default();

    format!(
        "---\nname: \"{}\"\ndescription: \"{}\"\n---\n\n{}",
        header_value(name),
        header_value(description),
        skill.content
    )
}

/// A value that survives the flat `key: "value"` header: one line, and no
/// `---` that would end the header early. Inner quotes need no escaping
/// since only the outermost pair is stripped on parse.
fn header_value(value: &str) -> String {
    let mut line = value.split_whitespace().collect::<Vec<_>>().join(" ");
    while line.contains("---") {
        line = line.replace("---", "--");
    }
    line
}

fn strip_md_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(3);
    match name.get(split..) {
        Some(ext) if ext.eq_ignore_ascii_case(".md") => &name[..split],
        _ => name,
    }
}

fn string_sequence(items: Vec<String>) -> Value {
    Value::Sequence(items.into_iter().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_map::resolve_context_map;
    use crate::directory::resolve_directory;
    use contextforge_core::{BlockMetadata, BlockType};

    fn skill_block() -> Block {
        Block::new("# Writer\nWrite well.", BlockType::skill(), Zone::Stable, 0.0).with_metadata(
            BlockMetadata {
                skill_name: Some("writer".into()),
                skill_description: Some("Writes things".into()),
                ..BlockMetadata::default()
            },
        )
    }

    fn reference(content: &str, zone: Zone, position: f64, filename: &str) -> Block {
        Block::new(content, BlockType::reference(), zone, position).with_metadata(BlockMetadata {
            skill_name: Some(filename.into()),
            ..BlockMetadata::default()
        })
    }

    #[test]
    fn session_export_writes_skill_and_references() {
        let blocks = vec![
            Block::new("## Today\nnotes", BlockType::note(), Zone::Working, 1.0),
            skill_block(),
            reference("rules", Zone::Permanent, 0.0, "rules.md"),
        ];
        let files = export_session(&blocks, "Session");

        let skill = files.get("SKILL.md").unwrap();
        assert!(skill.starts_with("---\nname: \"writer\"\ndescription: \"Writes things\"\n---\n\n"));
        assert_eq!(files.get("references/permanent/rules.md"), Some("rules"));
        assert_eq!(files.get("references/working/today.md"), Some("## Today\nnotes"));
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn header_quotes_round_trip() {
        let mut skill = skill_block();
        skill.metadata.as_mut().unwrap().skill_description =
            Some(r#"Say "hello" and 'bye': politely"#.into());

        let files = export_session(&[skill], "fallback");
        let doc = crate::document::parse_document(files.get("SKILL.md").unwrap(), None).unwrap();
        assert_eq!(doc.metadata.skill_name, "writer");
        assert_eq!(doc.metadata.skill_description, r#"Say "hello" and 'bye': politely"#);
        assert_eq!(doc.content, "# Writer\nWrite well.");
    }

    #[test]
    fn multiline_description_cannot_end_the_header() {
        let mut skill = skill_block();
        skill.metadata.as_mut().unwrap().skill_description =
            Some("Use for \"x\"\n---\ninjected: yes".into());

        let files = export_session(&[skill], "fallback");
        let doc = crate::document::parse_document(files.get("SKILL.md").unwrap(), None).unwrap();
        assert_eq!(doc.metadata.skill_name, "writer");
        assert_eq!(doc.metadata.skill_description, "Use for \"x\" -- injected: yes");
        assert_eq!(doc.content, "# Writer\nWrite well.");
    }

    #[test]
    fn session_without_skill_uses_fallback_header() {
        let files = export_session(&[], "My Session");
        let skill = files.get("SKILL.md").unwrap();
        assert!(skill.contains("name: \"My Session\""));
        assert!(skill.contains("Exported from ContextForge"));
        assert!(skill.ends_with("This skill was exported from a ContextForge session."));
    }

    #[test]
    fn colliding_titles_get_suffixes() {
        let blocks = vec![
            Block::new("# Notes\na", BlockType::note(), Zone::Stable, 0.0),
            Block::new("# Notes\nb", BlockType::note(), Zone::Stable, 1.0),
        ];
        let files = export_session(&blocks, "s");
        assert!(files.contains("references/stable/notes.md"));
        assert!(files.contains("references/stable/notes-1.md"));
    }

    #[test]
    fn md_extension_is_stripped_case_insensitively() {
        assert_eq!(strip_md_extension("Guide.MD"), "Guide");
        assert_eq!(strip_md_extension("guide"), "guide");
        assert_eq!(strip_md_extension("md"), "md");
    }

    #[test]
    fn exported_session_resolves_back() {
        let blocks = vec![
            skill_block(),
            reference("p", Zone::Permanent, 0.0, "p.md"),
            reference("s", Zone::Stable, 0.0, "s.md"),
            reference("w", Zone::Working, 0.0, "w.md"),
        ];
        let files = export_session(&blocks, "fallback");
        let resolved = resolve_directory(&files, None).unwrap();

        assert_eq!(resolved.document.metadata.skill_name, "writer");
        assert_eq!(resolved.document.metadata.skill_description, "Writes things");
        assert_eq!(resolved.document.content, "# Writer\nWrite well.");
        let zones: Vec<Zone> = resolved.references.iter().map(|r| r.zone).collect();
        assert_eq!(zones, vec![Zone::Permanent, Zone::Stable, Zone::Working]);
    }

    #[test]
    fn exported_project_resolves_back_as_chain() {
        let shared = reference("shared rules", Zone::Permanent, 0.0, "rules.md");
        let steps = vec![
            ExportStep {
                name: Some("Research".into()),
                step_number: 0,
                blocks: vec![
                    skill_block(),
                    shared.clone(),
                    reference("sources", Zone::Stable, 0.0, "sources.md"),
                ],
            },
            ExportStep {
                name: None,
                step_number: 1,
                blocks: vec![shared, reference("outline", Zone::Working, 0.0, "outline.md")],
            },
        ];

        let files = export_project(&steps, "Paper").unwrap();
        assert_eq!(files.len(), 5, "shared content is written once");

        let resolved = resolve_directory(&files, None).unwrap();
        assert_eq!(resolved.document.metadata.skill_name, "writer");

        let map = files.context_map().unwrap();
        let contexts = resolve_context_map(map, &files.paths()).unwrap();
        let keys: Vec<&str> = contexts.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["research", "step-2"]);

        assert_eq!(contexts[0].label, "Research");
        assert_eq!(contexts[0].permanent, vec!["references/permanent/rules.md"]);
        assert_eq!(contexts[0].stable, vec!["references/stable/sources.md"]);
        assert!(contexts[0].depends_on.is_empty());

        assert_eq!(contexts[1].label, "Step 2");
        assert_eq!(contexts[1].permanent, vec!["references/permanent/rules.md"]);
        assert_eq!(contexts[1].working, vec!["references/working/outline.md"]);
        assert_eq!(contexts[1].depends_on, vec!["research"]);
    }

    #[test]
    fn duplicate_step_names_get_distinct_keys() {
        let steps = vec![
            ExportStep {
                name: Some("Draft".into()),
                step_number: 0,
                blocks: vec![],
            },
            ExportStep {
                name: Some("Draft".into()),
                step_number: 1,
                blocks: vec![],
            },
        ];
        let files = export_project(&steps, "p").unwrap();
        let contexts = resolve_context_map(files.context_map().unwrap(), &files.paths()).unwrap();
        let keys: Vec<&str> = contexts.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["draft", "draft-1"]);
        assert_eq!(contexts[1].depends_on, vec!["draft"]);
    }
}
