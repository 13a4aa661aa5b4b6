//! Definition, reference, per-file and fuzzy symbol lookups.
//!
//! Every query first makes sure the index is loaded and returns an empty
//! result when it cannot be; only [`QueryEngine::load`] reports why.
//! Symbol queries match by case-insensitive substring over the raw symbol
//! string, so partial and fully qualified queries both work.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use sciplens_config::AppConfig;

use crate::index::{Document, IndexCache, IndexError, IndexStats, Occurrence, ScipIndex};
use crate::outline::{self, CodeTreeNode};
use crate::snippet::SourceLines;
use crate::symbol::{self, SymbolKind};

/// A definition site with the current source line at that position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub symbol: String,
    pub file: String,
    pub line: u32,
    pub character: u32,
    pub snippet: String,
}

/// Any occurrence of a symbol, labelled with its most significant role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub symbol: String,
    pub file: String,
    pub line: u32,
    pub character: u32,
    pub role: &'static str,
}

/// A symbol defined in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSymbol {
    pub symbol: String,
    pub name: String,
    pub kind: SymbolKind,
    pub line: u32,
    pub character: u32,
}

/// An occurrence whose readable name matched a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub line: u32,
    pub character: u32,
    pub role: &'static str,
}

/// Read-only queries over one project's SCIP index.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    cache: Arc<IndexCache>,
    project_root: PathBuf,
    outline_extensions: Vec<String>,
}

impl QueryEngine {
    /// Create an engine over `cache`, resolving document paths against
    /// `project_root`. Uses the default outline extensions.
    pub fn new(cache: Arc<IndexCache>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            cache,
            project_root: project_root.into(),
            outline_extensions: sciplens_config::OutlineConfig::default().extensions,
        }
    }

    /// Create an engine with its own cache from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        let cache = Arc::new(IndexCache::new(config.index_file()));
        Self::new(cache, config.index.project_root.clone())
            .with_outline_extensions(config.outline.extensions.clone())
    }

    /// Restrict the outline to files with these extensions (no leading dot).
    pub fn with_outline_extensions(mut self, extensions: Vec<String>) -> Self {
        self.outline_extensions = extensions;
        self
    }

    pub fn cache(&self) -> &IndexCache {
        &self.cache
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Whether the backing index file exists.
    pub async fn index_exists(&self) -> bool {
        self.cache.index_exists().await
    }

    /// Explicitly load the index, surfacing why it is unavailable.
    pub async fn load(&self) -> Result<Arc<ScipIndex>, IndexError> {
        self.cache.load().await
    }

    /// Discard the loaded index; the next query reloads it.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Size summary of the index, or zeros when it is unavailable.
    pub async fn stats(&self) -> IndexStats {
        match self.cache.get().await {
            Some(index) => index.stats(),
            None => IndexStats::default(),
        }
    }

    /// Definition occurrences whose symbol contains `symbol`.
    ///
    /// `context_file` is accepted for callers that know where the lookup
    /// started but does not narrow the result.
    pub async fn find_definition(
        &self,
        symbol: &str,
        context_file: Option<&str>,
    ) -> Vec<Definition> {
        let Some(index) = self.cache.get().await else {
            return Vec::new();
        };
        debug!(symbol, context_file = ?context_file, "Finding definitions");

        let query = normalize(symbol);
        let mut lines = SourceLines::new(&self.project_root);
        let mut definitions = Vec::new();
        for (document, occurrence) in matching_occurrences(&index, &query) {
            if !occurrence.roles.is_definition() {
                continue;
            }
            definitions.push(Definition {
                symbol: occurrence.symbol.clone(),
                file: document.relative_path.clone(),
                line: occurrence.line,
                character: occurrence.character,
                snippet: lines.line(&document.relative_path, occurrence.line).await,
            });
        }

        debug!(symbol, matches = definitions.len(), "Definitions found");
        definitions
    }

    /// Every occurrence, in any role, whose symbol contains `symbol`.
    pub async fn find_references(&self, symbol: &str) -> Vec<Reference> {
        let Some(index) = self.cache.get().await else {
            return Vec::new();
        };
        let references = references_in(&index, symbol);
        debug!(symbol, matches = references.len(), "References found");
        references
    }

    /// Symbols defined in `file`, an exact document path. Each raw symbol is
    /// listed once, at its first definition.
    pub async fn list_symbols(&self, file: &str) -> Vec<FileSymbol> {
        let Some(index) = self.cache.get().await else {
            return Vec::new();
        };
        symbols_in(&index, file)
    }

    /// Every occurrence whose readable name contains `query`. Not deduplicated.
    pub async fn search_symbols(&self, query: &str) -> Vec<SymbolMatch> {
        let Some(index) = self.cache.get().await else {
            return Vec::new();
        };
        let matches = search_in(&index, query);
        debug!(query, matches = matches.len(), "Symbol search finished");
        matches
    }

    /// Module → class → method outline of the whole project.
    pub async fn build_project_tree(&self) -> Vec<CodeTreeNode> {
        let Some(index) = self.cache.get().await else {
            return Vec::new();
        };
        outline::build_tree(&index, &self.outline_extensions)
    }
}

/// Case-insensitive, whitespace-trimmed form used for matching.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Occurrences whose normalized symbol contains `query`, in document order.
/// An empty query matches every occurrence.
fn matching_occurrences<'a>(
    index: &'a ScipIndex,
    query: &'a str,
) -> impl Iterator<Item = (&'a Document, &'a Occurrence)> + 'a {
    index
        .documents
        .iter()
        .flat_map(|document| document.occurrences.iter().map(move |o| (document, o)))
        .filter(move |(_, occurrence)| normalize(&occurrence.symbol).contains(query))
}

fn references_in(index: &ScipIndex, symbol: &str) -> Vec<Reference> {
    let query = normalize(symbol);
    matching_occurrences(index, &query)
        .map(|(document, occurrence)| Reference {
            symbol: occurrence.symbol.clone(),
            file: document.relative_path.clone(),
            line: occurrence.line,
            character: occurrence.character,
            role: occurrence.roles.describe(),
        })
        .collect()
}

fn symbols_in(index: &ScipIndex, file: &str) -> Vec<FileSymbol> {
    let Some(document) = index.document(file) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .occurrences
        .iter()
        .filter(|o| o.roles.is_definition())
        .filter(|o| seen.insert(o.symbol.as_str()))
        .map(|occurrence| {
            let parsed = symbol::parse(&occurrence.symbol);
            FileSymbol {
                symbol: occurrence.symbol.clone(),
                name: parsed.name,
                kind: parsed.kind,
                line: occurrence.line,
                character: occurrence.character,
            }
        })
        .collect()
}

fn search_in(index: &ScipIndex, query: &str) -> Vec<SymbolMatch> {
    let query = normalize(query);
    let mut matches = Vec::new();
    for document in &index.documents {
        for occurrence in &document.occurrences {
            let parsed = symbol::parse(&occurrence.symbol);
            if !parsed.name.to_lowercase().contains(&query) {
                continue;
            }
            matches.push(SymbolMatch {
                symbol: occurrence.symbol.clone(),
                name: parsed.name,
                kind: parsed.kind,
                file: document.relative_path.clone(),
                line: occurrence.line,
                character: occurrence.character,
                role: occurrence.roles.describe(),
            });
        }
    }
    matches
}
