//! Import planning: resolved package → blocks, templates, workflow, project.
//!
//! Planning is pure. Nothing here touches a store; the engine persists a
//! plan afterwards.

use contextforge_config::ImportConfig;
use contextforge_core::{
    Block, BlockMetadata, BlockType, DEFAULT_CARRY_FORWARD, ImportError, Project, SourceKind,
    Step, Template, TemplateBlock, Workflow, Zone,
};
use contextforge_skills::{
    ContextMapContext, PackageFiles, ResolvedPackage, SkillDocument, filename_from_path,
};
use serde::{Deserialize, Serialize};

/// Where a package came from, recorded on every imported block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub kind: SourceKind,
    /// Directory, archive name or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl SourceInfo {
    pub fn new(kind: SourceKind, reference: Option<String>) -> Self {
        Self { kind, reference }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Zone the primary document lands in.
    pub skill_zone: Zone,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            skill_zone: config.default_skill_zone,
        }
    }
}

/// A single-session import: primary document plus every reference.
#[derive(Debug, Clone)]
pub struct SkillImportPlan {
    pub skill_block: Block,
    pub reference_blocks: Vec<Block>,
}

/// A multi-context import.
#[derive(Debug, Clone)]
pub struct ProjectImportPlan {
    pub skill_block: Block,
    /// The first context's files, imported into the live session.
    pub session_blocks: Vec<Block>,
    /// One template per remaining context, in resolved order.
    pub templates: Vec<Template>,
    /// Step template ids are filled in once templates are stored.
    pub workflow: Workflow,
    pub project: Project,
}

/// Plan a package without a context map.
pub fn plan_skill_import(
    package: &ResolvedPackage,
    source: &SourceInfo,
    options: ImportOptions,
) -> SkillImportPlan {
    let skill_name = &package.document.metadata.skill_name;
    let reference_blocks = package
        .references
        .iter()
        .enumerate()
        .map(|(i, reference)| {
            reference_block(
                &reference.content,
                reference.zone,
                i as f64,
                &reference.relative_path,
                skill_name,
                source.kind,
            )
        })
        .collect();

    SkillImportPlan {
        skill_block: skill_block(&package.document, source, options.skill_zone),
        reference_blocks,
    }
}

/// Plan a package split into ordered contexts.
///
/// `contexts` must already be in dependency order; the first one is
/// imported into the live session and the rest become templates.
pub fn plan_project_import(
    document: &SkillDocument,
    contexts: &[ContextMapContext],
    files: &PackageFiles,
    source: &SourceInfo,
    options: ImportOptions,
) -> Result<ProjectImportPlan, ImportError> {
    let (first, rest) = contexts.split_first().ok_or(ImportError::NoContexts)?;
    let skill_name = document.metadata.skill_name.as_str();
    let description = non_empty(&document.metadata.skill_description);

    let session_blocks = context_blocks(first, files, skill_name, source.kind);

    let templates = rest
        .iter()
        .enumerate()
        .map(|(i, context)| {
            let blocks = context_blocks(context, files, skill_name, source.kind)
                .iter()
                .map(TemplateBlock::from)
                .collect();
            Template::new(
                context.label.clone(),
                Some(format!("Step {}: {}", i + 2, context.label)),
                blocks,
            )
        })
        .collect();

    let steps = contexts
        .iter()
        .map(|context| Step {
            template_id: None,
            name: context.label.clone(),
            description: None,
            carry_forward_zones: Some(DEFAULT_CARRY_FORWARD.to_vec()),
        })
        .collect();

    Ok(ProjectImportPlan {
        skill_block: skill_block(document, source, options.skill_zone),
        session_blocks,
        templates,
        workflow: Workflow::new(format!("{skill_name} Workflow"), description.clone(), steps),
        project: Project::new(skill_name, description, None),
    })
}

// ── Block builders ─────────────────────────────────────────────────────────

fn skill_block(document: &SkillDocument, source: &SourceInfo, zone: Zone) -> Block {
    Block::new(document.content.clone(), BlockType::skill(), zone, 0.0).with_metadata(
        BlockMetadata {
            skill_name: Some(document.metadata.skill_name.clone()),
            skill_description: non_empty(&document.metadata.skill_description),
            parent_skill_name: None,
            source_type: Some(source.kind),
            source_ref: source.reference.clone(),
        },
    )
}

fn reference_block(
    content: &str,
    zone: Zone,
    position: f64,
    relative_path: &str,
    parent_skill_name: &str,
    source_kind: SourceKind,
) -> Block {
    Block::new(content, BlockType::reference(), zone, position).with_metadata(BlockMetadata {
        skill_name: Some(filename_from_path(relative_path).to_string()),
        skill_description: None,
        parent_skill_name: Some(parent_skill_name.to_string()),
        source_type: Some(source_kind),
        source_ref: Some(relative_path.to_string()),
    })
}

/// A context's files as reference blocks, Permanent → Stable → Working in
/// list order, positioned 0, 1, 2, ... Paths missing from the package or
/// holding empty content are skipped.
fn context_blocks(
    context: &ContextMapContext,
    files: &PackageFiles,
    parent_skill_name: &str,
    source_kind: SourceKind,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    for zone in Zone::ALL {
        for path in context.zone_files(zone) {
            let Some(content) = files.get(path).filter(|c| !c.is_empty()) else {
                tracing::debug!(context = %context.key, path = %path, "Skipping missing or empty file");
                continue;
            };
            let position = blocks.len() as f64;
            blocks.push(reference_block(
                content,
                zone,
                position,
                path,
                parent_skill_name,
                source_kind,
            ));
        }
    }
    blocks
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contextforge_skills::{SkillMetadata, resolve_context_map, resolve_directory};

    fn document() -> SkillDocument {
        SkillDocument {
            content: "# Writer".into(),
            metadata: SkillMetadata {
                skill_name: "writer".into(),
                skill_description: "Writes things".into(),
            },
        }
    }

    fn files() -> PackageFiles {
        [
            ("SKILL.md", "---\nname: writer\n---\n# Writer"),
            ("references/permanent/rules.md", "rules"),
            ("references/stable/sources.md", "sources"),
            ("references/working/outline.md", "outline"),
            ("references/working/empty.md", ""),
        ]
        .into_iter()
        .collect()
    }

    fn contexts(files: &PackageFiles) -> Vec<ContextMapContext> {
        let yaml = r#"
contexts:
  draft:
    label: Draft
    working: [references/working/outline.md, references/working/empty.md]
    stable: [references/stable/sources.md]
    depends_on: [research]
  research:
    label: Research
    permanent: [references/permanent/rules.md]
    stable: [references/stable/sources.md]
"#;
        resolve_context_map(yaml, &files.paths()).unwrap()
    }

    fn source() -> SourceInfo {
        SourceInfo::new(SourceKind::Local, Some("/skills/writer".into()))
    }

    #[test]
    fn project_plan_shape() {
        let files = files();
        let plan = plan_project_import(
            &document(),
            &contexts(&files),
            &files,
            &source(),
            ImportOptions::default(),
        )
        .unwrap();

        assert_eq!(plan.skill_block.zone, Zone::Stable);
        assert!(plan.skill_block.block_type.is_skill());
        let meta = plan.skill_block.metadata.as_ref().unwrap();
        assert_eq!(meta.skill_name.as_deref(), Some("writer"));
        assert_eq!(meta.source_ref.as_deref(), Some("/skills/writer"));

        let session: Vec<(&str, Zone)> = plan
            .session_blocks
            .iter()
            .map(|b| (b.content.as_str(), b.zone))
            .collect();
        assert_eq!(
            session,
            vec![("rules", Zone::Permanent), ("sources", Zone::Stable)]
        );

        assert_eq!(plan.templates.len(), 1);
        let template = &plan.templates[0];
        assert_eq!(template.name, "Draft");
        assert_eq!(template.description.as_deref(), Some("Step 2: Draft"));
        let positions: Vec<(f64, Zone)> = template.blocks.iter().map(|b| (b.position, b.zone)).collect();
        assert_eq!(positions, vec![(0.0, Zone::Stable), (1.0, Zone::Working)]);

        assert_eq!(plan.workflow.name, "writer Workflow");
        assert_eq!(plan.workflow.description.as_deref(), Some("Writes things"));
        let steps: Vec<&str> = plan.workflow.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(steps, vec!["Research", "Draft"]);
        for step in &plan.workflow.steps {
            assert!(step.template_id.is_none());
            assert_eq!(step.carry_forward_zones(), vec![Zone::Permanent, Zone::Working]);
        }

        assert_eq!(plan.project.name, "writer");
        assert_eq!(plan.project.current_step, 0);
    }

    #[test]
    fn reference_metadata_records_provenance() {
        let files = files();
        let plan = plan_project_import(
            &document(),
            &contexts(&files),
            &files,
            &source(),
            ImportOptions::default(),
        )
        .unwrap();
        let meta = plan.session_blocks[0].metadata.as_ref().unwrap();
        assert_eq!(meta.skill_name.as_deref(), Some("rules.md"));
        assert_eq!(meta.parent_skill_name.as_deref(), Some("writer"));
        assert_eq!(meta.source_type, Some(SourceKind::Local));
        assert_eq!(meta.source_ref.as_deref(), Some("references/permanent/rules.md"));
    }

    #[test]
    fn no_contexts_is_rejected() {
        let err = plan_project_import(
            &document(),
            &[],
            &files(),
            &source(),
            ImportOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, ImportError::NoContexts);
    }

    #[test]
    fn skill_zone_follows_options() {
        let files = files();
        let resolved = resolve_directory(&files, None).unwrap();
        let options = ImportOptions {
            skill_zone: Zone::Permanent,
        };
        let plan = plan_skill_import(&resolved, &source(), options);
        assert_eq!(plan.skill_block.zone, Zone::Permanent);
        assert_eq!(plan.reference_blocks.len(), 4);
        assert_eq!(plan.reference_blocks[0].zone, Zone::Permanent);
    }

    #[test]
    fn empty_description_is_absent() {
        let mut doc = document();
        doc.metadata.skill_description.clear();
        let files = files();
        let plan = plan_project_import(&doc, &contexts(&files), &files, &source(), ImportOptions::default())
            .unwrap();
        assert!(plan.workflow.description.is_none());
        assert!(plan.project.description.is_none());
    }
}
