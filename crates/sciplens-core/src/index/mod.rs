//! The decoded SCIP index and the cache that owns it.
//!
//! [`ScipIndex`] is an immutable snapshot of the backing file, reduced to
//! what the query engine reads: document paths and their occurrences.
//! [`IndexCache`] loads it lazily, shares one in-flight load between
//! concurrent callers, and discards it on [`IndexCache::clear`].

mod cache;
mod error;
mod model;

pub use cache::IndexCache;
pub use error::IndexError;
pub use model::{Document, IndexStats, Occurrence, ScipIndex};
