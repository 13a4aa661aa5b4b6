#![deny(unsafe_code)]

//! Shared test utilities for the sciplens workspace.
//!
//! Provides a SCIP project fixture, config builders, and tracing helpers so
//! that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! sciplens-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod project;
pub mod tracing_setup;
