//! End-to-end query tests against real on-disk SCIP indexes.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sciplens_core::{IndexCache, IndexError, QueryEngine, SymbolKind};
use sciplens_test_utils::config::TestConfigBuilder;
use sciplens_test_utils::project::{
    DEFINITION, IMPORT, ScipProject, WRITE_ACCESS, def, occurrence, read,
};
use sciplens_test_utils::tracing_setup::init_test_tracing;

const APP_TS: &str = "export class Greeter {\n  greet() {\n    return \"hi\";\n  }\n}\n";
const MAIN_TS: &str = "import { Greeter } from \"./app\";\nconst g = new Greeter();\ng.greet();\n";

fn greeter_project() -> ScipProject {
    ScipProject::builder()
        .source("src/app.ts", APP_TS)
        .source("src/main.ts", MAIN_TS)
        .document(
            "src/app.ts",
            vec![
                def("`pkg`/Greeter#", 0, 13),
                def("`pkg`/Greeter#greet().", 1, 2),
            ],
        )
        .document(
            "src/main.ts",
            vec![
                occurrence("`pkg`/Greeter#", 0, 9, IMPORT),
                read("`pkg`/Greeter#", 1, 14),
                read("`pkg`/Greeter#greet().", 2, 2),
            ],
        )
        .build()
}

fn engine_for(project: &ScipProject) -> QueryEngine {
    QueryEngine::from_config(&project.config())
}

#[test_log::test(tokio::test)]
async fn test_find_definition_reads_snippet_from_disk() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let defs = engine.find_definition("`pkg`/Greeter#greet().", None).await;
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].file, "src/app.ts");
    assert_eq!((defs[0].line, defs[0].character), (1, 2));
    assert_eq!(defs[0].snippet, "  greet() {");
}

#[tokio::test]
async fn test_find_definition_uses_current_file_content() {
    let project = greeter_project();
    let engine = engine_for(&project);

    project.write_source("src/app.ts", "// moved\n  greet(name) {\n");
    let defs = engine.find_definition("greet()", None).await;
    assert_eq!(defs[0].snippet, "  greet(name) {");
}

#[tokio::test]
async fn test_find_definition_missing_source_gives_empty_snippet() {
    let project = ScipProject::builder()
        .document("src/gone.ts", vec![def("`pkg`/gone().", 4, 0)])
        .build();
    let engine = engine_for(&project);

    let defs = engine.find_definition("gone", None).await;
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].snippet, "");
}

#[tokio::test]
async fn test_find_definition_substring_excludes_non_definitions() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let defs = engine.find_definition("  greeter# ", None).await;
    let found: Vec<_> = defs.iter().map(|d| (d.file.as_str(), d.line)).collect();
    assert_eq!(found, vec![("src/app.ts", 0), ("src/app.ts", 1)]);
}

#[tokio::test]
async fn test_blank_query_matches_everything() {
    let project = greeter_project();
    let engine = engine_for(&project);

    assert_eq!(engine.find_definition("", None).await.len(), 2);
    assert_eq!(engine.find_references("   ").await.len(), 5);
    assert_eq!(engine.search_symbols("").await.len(), 5);
}

#[tokio::test]
async fn test_find_definition_context_file_does_not_narrow() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let without = engine.find_definition("Greeter#", None).await;
    let with = engine
        .find_definition("Greeter#", Some("src/main.ts"))
        .await;
    assert_eq!(without, with);
}

#[tokio::test]
async fn test_find_references_definition_outranks_write() {
    let project = ScipProject::builder()
        .source("src/app.ts", APP_TS)
        .document(
            "src/app.ts",
            vec![occurrence(
                "`pkg`/Greeter#greet().",
                1,
                2,
                DEFINITION | WRITE_ACCESS,
            )],
        )
        .build();
    let engine = engine_for(&project);

    let refs = engine.find_references("greet").await;
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].role, "definition");
}

#[tokio::test]
async fn test_find_references_all_roles() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let refs = engine.find_references("`pkg`/Greeter#").await;
    let roles: Vec<_> = refs.iter().map(|r| (r.file.as_str(), r.role)).collect();
    assert_eq!(
        roles,
        vec![
            ("src/app.ts", "definition"),
            ("src/app.ts", "definition"),
            ("src/main.ts", "import"),
            ("src/main.ts", "read"),
            ("src/main.ts", "read"),
        ]
    );
}

#[tokio::test]
async fn test_list_symbols_greeter_scenario() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let symbols = engine.list_symbols("src/app.ts").await;
    let listed: Vec<_> = symbols
        .iter()
        .map(|s| (s.name.as_str(), s.kind, s.line))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("Greeter", SymbolKind::Class, 0),
            ("greet", SymbolKind::Method, 1),
        ]
    );
}

#[tokio::test]
async fn test_list_symbols_never_repeats_a_symbol() {
    let project = ScipProject::builder()
        .document(
            "src/over.ts",
            vec![
                def("`pkg`/parse().", 3, 0),
                def("`pkg`/parse().", 7, 0),
                read("`pkg`/parse().", 9, 0),
            ],
        )
        .build();
    let engine = engine_for(&project);

    let symbols = engine.list_symbols("src/over.ts").await;
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].line, 3);
}

#[tokio::test]
async fn test_search_symbols_counts_every_occurrence() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let matches = engine.search_symbols("GREET").await;
    // Greeter: 3 occurrences, greet: 2 occurrences.
    assert_eq!(matches.len(), 5);
    assert_eq!(matches.iter().filter(|m| m.name == "greet").count(), 2);
    assert!(
        matches
            .iter()
            .any(|m| m.kind == SymbolKind::Class && m.role == "import")
    );
}

#[tokio::test]
async fn test_build_project_tree_greeter_scenario() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let tree = engine.build_project_tree().await;
    let modules: Vec<_> = tree.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(modules, vec!["app", "main"]);

    let app = &tree[0];
    assert_eq!(app.kind, SymbolKind::Module);
    assert_eq!(app.children.len(), 1);
    assert_eq!(app.children[0].kind, SymbolKind::Class);
    assert_eq!(app.children[0].name, "Greeter");
    assert_eq!(app.children[0].children.len(), 1);
    assert_eq!(app.children[0].children[0].kind, SymbolKind::Method);
    assert_eq!(app.children[0].children[0].name, "greet");

    assert!(tree[1].children.is_empty());
}

#[tokio::test]
async fn test_build_project_tree_is_idempotent() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let first = engine.build_project_tree().await;
    let second = engine.build_project_tree().await;
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_outline_respects_configured_extensions() {
    let project = ScipProject::builder()
        .document("src/app.ts", vec![def("`pkg`/A#", 0, 0)])
        .document("tools/gen.py", vec![def("`pkg`/gen().", 0, 0)])
        .build();
    let config = TestConfigBuilder::new()
        .project_root(project.root())
        .extensions(&["py"])
        .build();
    let engine = QueryEngine::from_config(&config);

    let tree = engine.build_project_tree().await;
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].name, "tools.gen");
}

#[tokio::test]
async fn test_index_outside_project_root() {
    init_test_tracing();
    let indexed = greeter_project();
    let sources = ScipProject::builder()
        .source("src/app.ts", APP_TS)
        .without_index()
        .build();
    let config = TestConfigBuilder::new()
        .project_root(sources.root())
        .index_path(&indexed.index_path())
        .log_level("debug")
        .build();
    config.validate().unwrap();
    let engine = QueryEngine::from_config(&config);

    assert_eq!(engine.cache().path(), indexed.index_path().as_path());
    let defs = engine.find_definition("Greeter#greet", None).await;
    assert_eq!(defs[0].snippet, "  greet() {");
}

#[tokio::test]
async fn test_queries_on_unindexed_project_are_empty() {
    let project = ScipProject::builder()
        .source("src/app.ts", APP_TS)
        .without_index()
        .build();
    let engine = engine_for(&project);

    assert!(!engine.index_exists().await);
    assert!(engine.find_definition("Greeter", None).await.is_empty());
    assert!(engine.find_references("Greeter").await.is_empty());
    assert!(engine.list_symbols("src/app.ts").await.is_empty());
    assert!(engine.search_symbols("Greeter").await.is_empty());
    assert!(engine.build_project_tree().await.is_empty());
    assert_eq!(engine.stats().await.documents, 0);

    let err = engine.load().await.unwrap_err();
    assert!(matches!(err, IndexError::NeedsReindex { .. }));
}

#[tokio::test]
async fn test_corrupt_index_is_distinguished_from_missing() {
    let project = greeter_project();
    project.corrupt_index();
    let engine = engine_for(&project);

    assert!(engine.index_exists().await);
    assert!(engine.load().await.is_err());
    assert!(engine.search_symbols("greet").await.is_empty());
}

#[tokio::test]
async fn test_clear_cache_then_inaccessible_index_is_empty() {
    let project = greeter_project();
    let engine = engine_for(&project);
    assert_eq!(engine.find_references("greet").await.len(), 2);

    project.remove_index();
    engine.clear_cache();

    assert!(engine.find_references("greet").await.is_empty());
    assert!(engine.build_project_tree().await.is_empty());
}

#[tokio::test]
async fn test_reindex_then_clear_serves_new_index() {
    let project = greeter_project();
    let engine = engine_for(&project);
    assert_eq!(engine.stats().await.documents, 2);

    let reindexed = ScipProject::builder()
        .document("src/only.ts", vec![def("`pkg`/only().", 0, 0)])
        .build();
    std::fs::copy(reindexed.index_path(), project.index_path()).unwrap();

    // Served from memory until explicitly cleared.
    assert_eq!(engine.stats().await.documents, 2);
    engine.clear_cache();
    assert_eq!(engine.stats().await.documents, 1);
}

#[tokio::test]
async fn test_engines_can_share_a_cache() {
    let project = greeter_project();
    let cache = Arc::new(IndexCache::new(project.index_path()));
    let a = QueryEngine::new(Arc::clone(&cache), project.root());
    let b = QueryEngine::new(Arc::clone(&cache), project.root());

    a.load().await.unwrap();
    assert!(b.cache().is_loaded());

    b.clear_cache();
    assert!(!a.cache().is_loaded());
}

#[tokio::test]
async fn test_stats() {
    let project = greeter_project();
    let engine = engine_for(&project);

    let stats = engine.stats().await;
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.occurrences, 5);
    assert_eq!(stats.definitions, 2);
}
