//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use std::path::Path;

use sciplens_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .project_root(project.root())
///     .extensions(&["ts"])
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn project_root(mut self, root: &Path) -> Self {
        self.config.index.project_root = root.to_path_buf();
        self
    }

    pub fn index_path(mut self, path: &Path) -> Self {
        self.config.index.path = path.to_path_buf();
        self
    }

    pub fn extensions(mut self, extensions: &[&str]) -> Self {
        self.config.outline.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
