//! On-disk SCIP project fixtures.
//!
//! [`ScipProject`] owns a temp directory holding source files and a real
//! protobuf-encoded `index.scip`, so tests exercise the same read and decode
//! path as production.
//!
//! # Example
//!
//! ```ignore
//! let project = ScipProject::builder()
//!     .source("src/app.ts", "class Greeter {}\n")
//!     .document("src/app.ts", vec![def("`pkg`/Greeter#", 0, 6)])
//!     .build();
//! let cache = IndexCache::new(project.index_path());
//! ```

use std::path::{Path, PathBuf};

use protobuf::Message;
use scip::types::{Document, Index, Occurrence, SymbolRole};
use sciplens_config::AppConfig;
use tempfile::TempDir;

pub const DEFINITION: i32 = SymbolRole::Definition as i32;
pub const IMPORT: i32 = SymbolRole::Import as i32;
pub const WRITE_ACCESS: i32 = SymbolRole::WriteAccess as i32;
pub const READ_ACCESS: i32 = SymbolRole::ReadAccess as i32;

/// An occurrence of `symbol` at `line`:`character` with the given role bits.
pub fn occurrence(symbol: &str, line: i32, character: i32, roles: i32) -> Occurrence {
    Occurrence {
        symbol: symbol.to_string(),
        range: vec![line, character, character + 1],
        symbol_roles: roles,
        ..Default::default()
    }
}

/// A definition occurrence.
pub fn def(symbol: &str, line: i32, character: i32) -> Occurrence {
    occurrence(symbol, line, character, DEFINITION)
}

/// A read-access occurrence.
pub fn read(symbol: &str, line: i32, character: i32) -> Occurrence {
    occurrence(symbol, line, character, READ_ACCESS)
}

/// A temp project directory with sources and an encoded index.
///
/// The directory is deleted when this value is dropped.
pub struct ScipProject {
    dir: TempDir,
    index: Index,
}

impl ScipProject {
    pub fn builder() -> ScipProjectBuilder {
        ScipProjectBuilder::default()
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn index_path(&self) -> PathBuf {
        self.root().join("index.scip")
    }

    /// Config pointing at this project and its index.
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.index.project_root = self.root().to_path_buf();
        config.index.path = PathBuf::from("index.scip");
        config
    }

    /// (Re)write the encoded index.
    pub fn write_index(&self) {
        let bytes = self
            .index
            .write_to_bytes()
            .expect("failed to encode SCIP index");
        std::fs::write(self.index_path(), bytes).expect("failed to write SCIP index");
    }

    /// Replace the index with bytes that do not decode.
    pub fn corrupt_index(&self) {
        std::fs::write(self.index_path(), [0xff, 0xff, 0xff, 0xff])
            .expect("failed to write corrupt index");
    }

    pub fn remove_index(&self) {
        std::fs::remove_file(self.index_path()).expect("failed to remove SCIP index");
    }

    /// Write a source file relative to the project root.
    pub fn write_source(&self, relative_path: &str, content: &str) {
        let path = self.root().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create source dir");
        }
        std::fs::write(path, content).expect("failed to write source file");
    }
}

/// Fluent builder for [`ScipProject`].
#[derive(Default)]
pub struct ScipProjectBuilder {
    sources: Vec<(String, String)>,
    documents: Vec<Document>,
    skip_index: bool,
}

impl ScipProjectBuilder {
    /// Add a source file on disk.
    pub fn source(mut self, relative_path: &str, content: &str) -> Self {
        self.sources
            .push((relative_path.to_string(), content.to_string()));
        self
    }

    /// Add an index document, in order.
    pub fn document(mut self, relative_path: &str, occurrences: Vec<Occurrence>) -> Self {
        self.documents.push(Document {
            relative_path: relative_path.to_string(),
            occurrences,
            ..Default::default()
        });
        self
    }

    /// Do not write `index.scip` (a project that was never indexed).
    pub fn without_index(mut self) -> Self {
        self.skip_index = true;
        self
    }

    pub fn build(self) -> ScipProject {
        let project = ScipProject {
            dir: TempDir::new().expect("failed to create temp dir"),
            index: Index {
                documents: self.documents,
                ..Default::default()
            },
        };
        for (path, content) in &self.sources {
            project.write_source(path, content);
        }
        if !self.skip_index {
            project.write_index();
        }
        project
    }
}
