//! Project outline: module/class/method nesting rebuilt from the flat
//! occurrence list.
//!
//! The index stores no parent pointers. Nesting comes from two sources:
//! the document a definition lives in gives its module, and a method's
//! symbol names its owning type (see [`symbol::extract_enclosing_type`]).
//! A method whose type has not been seen yet in the same document gets a
//! placeholder class with no location. A later definition of that class
//! produces a second, located node; the two are not merged.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

use serde::Serialize;

use crate::index::{Document, Occurrence, ScipIndex};
use crate::symbol::{self, ParsedSymbol, SymbolKind};

/// A node of the project outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeTreeNode {
    pub kind: SymbolKind,
    pub name: String,
    /// Absent for placeholder classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Absent for modules and placeholder classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<u32>,
    pub children: Vec<CodeTreeNode>,
}

impl CodeTreeNode {
    fn module(name: String, file: &str) -> Self {
        Self {
            kind: SymbolKind::Module,
            name,
            file: Some(file.to_string()),
            line: None,
            character: None,
            children: Vec::new(),
        }
    }

    fn placeholder_class(name: &str) -> Self {
        Self {
            kind: SymbolKind::Class,
            name: name.to_string(),
            file: None,
            line: None,
            character: None,
            children: Vec::new(),
        }
    }

    fn located(parsed: ParsedSymbol, file: &str, occurrence: &Occurrence) -> Self {
        Self {
            kind: parsed.kind,
            name: parsed.name,
            file: Some(file.to_string()),
            line: Some(occurrence.line),
            character: Some(occurrence.character),
            children: Vec::new(),
        }
    }
}

/// Build one module node per distinct module name, in first-seen order.
///
/// Documents whose extension is not in `extensions` are skipped. Documents
/// that map to the same module name share a node; the first one supplies its
/// `file`.
pub fn build_tree(index: &ScipIndex, extensions: &[String]) -> Vec<CodeTreeNode> {
    let mut modules: Vec<CodeTreeNode> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for document in &index.documents {
        if !has_supported_extension(&document.relative_path, extensions) {
            continue;
        }

        let children = document_outline(document);
        let name = module_name(&document.relative_path);
        let slot = match by_name.get(&name) {
            Some(&slot) => slot,
            None => {
                by_name.insert(name.clone(), modules.len());
                modules.push(CodeTreeNode::module(name, &document.relative_path));
                modules.len() - 1
            }
        };
        modules[slot].children.extend(children);
    }

    modules
}

/// Dotted module name for a document path.
///
/// Strips the extension, drops one leading `src` or `lib` directory, and
/// joins the remaining segments with `.`.
///
/// ```
/// use sciplens_core::outline::module_name;
///
/// assert_eq!(module_name("src/app.ts"), "app");
/// assert_eq!(module_name("lib/net/http.py"), "net.http");
/// assert_eq!(module_name("tools/build.rs"), "tools.build");
/// ```
pub fn module_name(relative_path: &str) -> String {
    let file_start = relative_path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let stem = match relative_path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &relative_path[..file_start + dot],
        _ => relative_path,
    };

    let mut segments: Vec<&str> = stem
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if segments.len() > 1 && matches!(segments[0], "src" | "lib") {
        segments.remove(0);
    }
    segments.join(".")
}

/// Render an outline as indented text, one node per line.
pub fn render(nodes: &[CodeTreeNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(&mut out, node, 0);
    }
    out
}

fn render_node(out: &mut String, node: &CodeTreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = match (&node.file, node.line) {
        (Some(file), Some(line)) if node.kind != SymbolKind::Module => {
            writeln!(out, "{indent}{} {}  ({file}:{})", node.kind, node.name, line + 1)
        }
        (Some(file), None) if node.kind == SymbolKind::Module => {
            writeln!(out, "{indent}{} {}  ({file})", node.kind, node.name)
        }
        _ => writeln!(out, "{indent}{} {}", node.kind, node.name),
    };
    for child in &node.children {
        render_node(out, child, depth + 1);
    }
}

fn has_supported_extension(relative_path: &str, extensions: &[String]) -> bool {
    Path::new(relative_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

/// Top-level nodes (classes and free functions) of one document, sorted.
fn document_outline(document: &Document) -> Vec<CodeTreeNode> {
    let mut top_level: Vec<CodeTreeNode> = Vec::new();
    let mut classes: HashMap<String, usize> = HashMap::new();
    let file = document.relative_path.as_str();

    for occurrence in document
        .occurrences
        .iter()
        .filter(|o| o.roles.is_definition())
    {
        let parsed = symbol::parse(&occurrence.symbol);
        match parsed.kind {
            SymbolKind::Class => {
                classes.insert(parsed.name.clone(), top_level.len());
                top_level.push(CodeTreeNode::located(parsed, file, occurrence));
            }
            SymbolKind::Method => {
                let method = CodeTreeNode::located(parsed, file, occurrence);
                match symbol::extract_enclosing_type(&occurrence.symbol) {
                    Some(owner) => {
                        let slot = match classes.get(owner) {
                            Some(&slot) => slot,
                            None => {
                                classes.insert(owner.to_string(), top_level.len());
                                top_level.push(CodeTreeNode::placeholder_class(owner));
                                top_level.len() - 1
                            }
                        };
                        top_level[slot].children.push(method);
                    }
                    None => top_level.push(method),
                }
            }
            SymbolKind::Function => {
                top_level.push(CodeTreeNode::located(parsed, file, occurrence));
            }
            _ => {}
        }
    }

    // Stable: equal names keep source order. Methods stay in source order.
    top_level.sort_by(|a, b| compare_names(&a.name, &b.name));
    top_level
}

/// Case-insensitive ordering; names differing only by case put lowercase
/// first.
///
/// Lowercased names compare by code point, not by collation, so accented
/// or other non-ASCII initials sort after every ASCII letter (`émile` after
/// `zeta`).
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
