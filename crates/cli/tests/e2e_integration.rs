//! End-to-end tests for ContextForge.
//!
//! These exercise the full pipeline from a package on disk through import
//! into a session, context assembly, workflow advance and export back to
//! disk.

use std::path::Path;
use std::sync::Arc;

use contextforge_config::BudgetConfig;
use contextforge_context::{assemble, assemble_request, budget_report, context_stats};
use contextforge_core::{
    Block, BlockType, ConversationTurn, Role, SessionStore, SourceKind, Zone,
};
use contextforge_skills::{
    ExportStep, PackageFiles, export_project, export_session, load_package_dir,
    resolve_context_map, resolve_directory,
};
use contextforge_store::InMemoryStore;
use contextforge_workflow::{ImportOptions, PackageImport, SourceInfo, WorkflowEngine};

// ── Fixtures ─────────────────────────────────────────────────────────────

const SKILL_MD: &str = "---\nname: essay-writer\ndescription: Drafts essays\n---\n\n# Essay Writer\nWrite plainly.";

const CONTEXT_MAP: &str = r#"
contexts:
  outline:
    label: Outline
    working: [references/working/outline.md]
    depends_on: [research]
  research:
    label: Research
    permanent: [references/permanent/rules.md]
    stable: [references/stable/sources.md]
"#;

fn write_package(root: &Path, with_map: bool) {
    let files = [
        ("SKILL.md", SKILL_MD),
        ("references/permanent/rules.md", "Cite every claim."),
        ("references/stable/sources.md", "Primary sources list."),
        ("references/working/outline.md", "1. Intro\n2. Body"),
        ("references/persona.md", "You are a careful editor."),
    ];
    for (path, content) in files {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }
    if with_map {
        std::fs::write(root.join("context-map.yaml"), CONTEXT_MAP).unwrap();
    }
}

fn engine() -> (Arc<InMemoryStore>, WorkflowEngine) {
    let store = Arc::new(InMemoryStore::new());
    let engine = WorkflowEngine::new(store.clone(), ImportOptions::default());
    (store, engine)
}

fn local_source(root: &Path) -> SourceInfo {
    SourceInfo::new(SourceKind::Local, Some(root.display().to_string()))
}

// ── Skill packages ───────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_skill_package_import_then_assemble() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), false);

    let files = load_package_dir(dir.path()).unwrap();
    assert!(files.context_map().is_none());

    let (store, engine) = engine();
    let session = store.create_session(Some("essay".into())).await.unwrap();
    let outcome = engine
        .import_package(&session, &files, None, &local_source(dir.path()))
        .await
        .unwrap();

    let PackageImport::Skill(skill) = outcome else {
        panic!("expected a skill import");
    };
    assert_eq!(skill.reference_block_ids.len(), 4);

    let blocks = store.list_blocks(&session).await.unwrap();
    assert_eq!(blocks.len(), 5);
    let skill_block = blocks.iter().find(|b| b.id == skill.skill_block_id).unwrap();
    assert_eq!(skill_block.zone, Zone::Stable);
    assert_eq!(skill_block.content, "# Essay Writer\nWrite plainly.");

    let messages = assemble(&blocks, "Write the intro.");
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[0].content, "Cite every claim.");
    assert!(messages[1].content.starts_with("Reference Material:\n\n# Essay Writer"));
    assert!(messages[1].content.contains("You are a careful editor."));
    assert_eq!(messages[2].content, "Current Context:\n\n1. Intro\n2. Body");
    assert_eq!(messages[3].content, "Write the intro.");
}

#[tokio::test]
async fn e2e_stats_and_budget_follow_imported_blocks() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), false);
    let files = load_package_dir(dir.path()).unwrap();

    let (store, engine) = engine();
    let session = store.create_session(None).await.unwrap();
    engine
        .import_package(&session, &files, None, &local_source(dir.path()))
        .await
        .unwrap();
    let blocks = store.list_blocks(&session).await.unwrap();

    let stats = context_stats(&blocks);
    assert_eq!(stats.permanent.count, 1);
    assert_eq!(stats.stable.count, 3);
    assert_eq!(stats.working.count, 1);
    assert_eq!(stats.total.count, 5);

    let tight = BudgetConfig {
        permanent: 1,
        stable: 1000,
        working: 1000,
        total: 5000,
    };
    let report = budget_report(&blocks, &tight);
    assert!(report.permanent.over_budget);
    assert!(!report.stable.over_budget);
    assert!(report.over_budget());
}

// ── Projects ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_project_import_and_advance() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), true);
    let files = load_package_dir(dir.path()).unwrap();

    let (store, engine) = engine();
    let session = store.create_session(None).await.unwrap();
    let outcome = engine
        .import_package(&session, &files, None, &local_source(dir.path()))
        .await
        .unwrap();

    let PackageImport::Project(project) = outcome else {
        panic!("expected a project import");
    };
    assert_eq!(project.template_count, 1);

    let workflow = store.get_workflow(&project.workflow_id).await.unwrap().unwrap();
    let steps: Vec<&str> = workflow.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(steps, vec!["Research", "Outline"]);

    // First context only: skill, rules, sources.
    let first = store.list_blocks(&session).await.unwrap();
    assert_eq!(first.len(), 3);

    let next = engine.advance(&session).await.unwrap();
    assert_eq!(next.step_number, 1);

    // Permanent carried, Stable dropped, the template's outline added.
    let second = store.list_blocks(&next.session_id).await.unwrap();
    let mut contents: Vec<(Zone, &str)> =
        second.iter().map(|b| (b.zone, b.content.as_str())).collect();
    contents.sort();
    assert_eq!(
        contents,
        vec![
            (Zone::Permanent, "Cite every claim."),
            (Zone::Working, "1. Intro\n2. Body"),
        ]
    );

    let stored = store.get_project(&project.project_id).await.unwrap().unwrap();
    assert_eq!(stored.current_step, 1);

    assert!(engine.advance(&next.session_id).await.is_err());
}

#[tokio::test]
async fn e2e_invalid_context_map_imports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), false);
    std::fs::write(
        dir.path().join("context-map.yaml"),
        "contexts:\n  a:\n    label: A\n    stable: [references/stable/missing.md]\n",
    )
    .unwrap();
    let files = load_package_dir(dir.path()).unwrap();

    let (store, engine) = engine();
    let session = store.create_session(None).await.unwrap();
    let err = engine
        .import_package(&session, &files, None, &local_source(dir.path()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("references/stable/missing.md"));
    assert!(store.list_blocks(&session).await.unwrap().is_empty());
}

// ── Assembly with history ────────────────────────────────────────────────

#[test]
fn e2e_history_sits_between_zones_and_prompt() {
    let blocks = vec![
        Block::new("Be brief.", BlockType::system_prompt(), Zone::Permanent, 0.0),
        Block::new("Notes", BlockType::note(), Zone::Working, 0.0),
    ];
    let history = vec![
        ConversationTurn::user("Hi"),
        ConversationTurn::assistant("Hello"),
    ];

    let request = assemble_request(&blocks, &history, "Next?");
    assert_eq!(request.system_prompt.as_deref(), Some("Be brief."));
    let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant, Role::User]);
    assert!(request.estimated_tokens > 0);
}

// ── Export ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_exported_session_reimports() {
    let source_dir = tempfile::tempdir().unwrap();
    write_package(source_dir.path(), false);
    let files = load_package_dir(source_dir.path()).unwrap();

    let (store, engine) = engine();
    let session = store.create_session(None).await.unwrap();
    engine
        .import_package(&session, &files, None, &local_source(source_dir.path()))
        .await
        .unwrap();
    let blocks = store.list_blocks(&session).await.unwrap();

    let out = tempfile::tempdir().unwrap();
    export_session(&blocks, "fallback").write_to(out.path()).unwrap();

    let reloaded = load_package_dir(out.path()).unwrap();
    let resolved = resolve_directory(&reloaded, None).unwrap();
    assert_eq!(resolved.document.metadata.skill_name, "essay-writer");
    assert_eq!(resolved.document.metadata.skill_description, "Drafts essays");
    assert_eq!(resolved.references.len(), 4);

    let zone_of = |content: &str| {
        resolved
            .references
            .iter()
            .find(|r| r.content == content)
            .map(|r| r.zone)
    };
    assert_eq!(zone_of("Cite every claim."), Some(Zone::Permanent));
    assert_eq!(zone_of("You are a careful editor."), Some(Zone::Stable));
    assert_eq!(zone_of("1. Intro\n2. Body"), Some(Zone::Working));
}

#[test]
fn e2e_exported_project_resolves_in_step_order() {
    let rules = Block::new("Cite every claim.", BlockType::note(), Zone::Permanent, 0.0);
    let steps = vec![
        ExportStep {
            name: Some("Research".into()),
            step_number: 0,
            blocks: vec![
                rules.clone(),
                Block::new("Sources", BlockType::note(), Zone::Stable, 0.0),
            ],
        },
        ExportStep {
            name: None,
            step_number: 1,
            blocks: vec![
                rules,
                Block::new("# Outline\nIntro", BlockType::note(), Zone::Working, 0.0),
            ],
        },
    ];

    let out = tempfile::tempdir().unwrap();
    export_project(&steps, "Essay")
        .unwrap()
        .write_to(out.path())
        .unwrap();

    let reloaded: PackageFiles = load_package_dir(out.path()).unwrap();
    let map = reloaded.context_map().unwrap();
    let contexts = resolve_context_map(map, &reloaded.paths()).unwrap();
    let labels: Vec<&str> = contexts.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Research", "Step 2"]);
    assert_eq!(contexts[0].permanent, contexts[1].permanent);

    // The shared rules block is written once.
    let permanent_files = reloaded
        .paths()
        .into_iter()
        .filter(|p| p.starts_with("references/permanent/"))
        .count();
    assert_eq!(permanent_files, 1);
}
