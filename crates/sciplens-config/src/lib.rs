#![deny(unsafe_code)]

//! Configuration loading and validation for sciplens.
//!
//! Loads a TOML configuration file and validates it. [`AppConfig`] is the
//! central configuration structure: where the project lives, where its SCIP
//! index is written by the external indexer, and which source files the
//! outline covers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backing index location.
    #[serde(default)]
    pub index: IndexConfig,

    /// Project outline settings.
    #[serde(default)]
    pub outline: OutlineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the project and its SCIP index live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Project root. Document paths stored in the index are relative to it.
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    /// Index file produced by the external indexer. Relative paths resolve
    /// against `project_root`.
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            path: default_index_path(),
        }
    }
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_index_path() -> PathBuf {
    PathBuf::from("index.scip")
}

/// Outline builder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// File extensions (without the leading dot) that produce module nodes.
    #[serde(default = "default_outline_extensions")]
    pub extensions: Vec<String>,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            extensions: default_outline_extensions(),
        }
    }
}

fn default_outline_extensions() -> Vec<String> {
    ["ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "rs", "go", "java"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "index.path must not be empty".to_string(),
            ));
        }

        if self.outline.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "outline.extensions must list at least one extension".to_string(),
            ));
        }
        for (i, ext) in self.outline.extensions.iter().enumerate() {
            if ext.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "outline.extensions[{i}] must not be empty"
                )));
            }
            if ext.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "outline.extensions[{i}] must not start with '.', got {ext:?}"
                )));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }

    /// Resolved location of the backing index file.
    pub fn index_file(&self) -> PathBuf {
        if self.index.path.is_absolute() {
            self.index.path.clone()
        } else {
            self.index.project_root.join(&self.index.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.index.project_root, PathBuf::from("."));
        assert_eq!(config.index.path, PathBuf::from("index.scip"));
        assert!(config.outline.extensions.contains(&"ts".to_string()));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.index_file(), PathBuf::from("./index.scip"));
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [index]
            project_root = "/work/app"
            path = "build/index.scip"

            [outline]
            extensions = ["ts", "py"]

            [logging]
            level = "debug"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.index.project_root, PathBuf::from("/work/app"));
        assert_eq!(
            config.index_file(),
            PathBuf::from("/work/app/build/index.scip")
        );
        assert_eq!(config.outline.extensions, vec!["ts", "py"]);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_absolute_index_path_ignores_root() {
        let toml = r#"
            [index]
            project_root = "/work/app"
            path = "/var/cache/app.scip"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.index_file(), PathBuf::from("/var/cache/app.scip"));
    }

    #[test]
    fn test_validation_rejects_empty_index_path() {
        let toml = r#"
            [index]
            path = ""
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_extension_list() {
        let toml = r#"
            [outline]
            extensions = []
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_dotted_extension() {
        let toml = r#"
            [outline]
            extensions = [".ts"]
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("outline.extensions[0]"));
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let toml = r#"
            [logging]
            level = "loud"
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[test_log::test(tokio::test)]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sciplens.toml");
        tokio::fs::write(&path, b"[index]\npath = \"out.scip\"\n")
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.index.path, PathBuf::from("out.scip"));
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/file.toml")).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[").await.unwrap();

        let result = AppConfig::load(&path).await;
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }
}
