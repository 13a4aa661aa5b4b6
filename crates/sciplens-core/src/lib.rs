#![deny(unsafe_code)]

//! sciplens core query engine.
//!
//! Answers code navigation questions from a precomputed SCIP index: where a
//! symbol is defined, where it is used, what a file defines, and how the
//! project nests into modules, classes and methods. The index is produced by
//! an external indexer; this crate only reads it.

/// Decoded index model and the lazily loaded cache that owns it.
pub mod index;
/// In-memory capture of operational events.
pub mod logging;
/// Module/class/method outline reconstruction.
pub mod outline;
/// Definition, reference, per-file and fuzzy symbol queries.
pub mod query;
/// Occurrence role bitmask classification.
pub mod roles;
mod snippet;
/// SCIP symbol string grammar.
pub mod symbol;

pub use index::{IndexCache, IndexError, IndexStats, ScipIndex};
pub use logging::{EventLog, EventReader};
pub use outline::CodeTreeNode;
pub use query::{Definition, FileSymbol, QueryEngine, Reference, SymbolMatch};
pub use roles::SymbolRoles;
pub use symbol::{ParsedSymbol, SymbolKind};
