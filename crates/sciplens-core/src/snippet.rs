//! Source line lookup for definition snippets.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

/// Reads lines from the project's current on-disk sources, each file at most
/// once per instance.
pub(crate) struct SourceLines {
    root: PathBuf,
    files: HashMap<String, Option<String>>,
}

impl SourceLines {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: HashMap::new(),
        }
    }

    /// Line `line` (0-based) of `relative_path`, split on `\n` only, so a
    /// CRLF file keeps its trailing `\r`. Empty when the file cannot be read
    /// or is shorter than that.
    pub(crate) async fn line(&mut self, relative_path: &str, line: u32) -> String {
        if !self.files.contains_key(relative_path) {
            let path = self.root.join(relative_path);
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => Some(content),
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "Source unavailable for snippet");
                    None
                }
            };
            self.files.insert(relative_path.to_string(), content);
        }

        self.files
            .get(relative_path)
            .and_then(Option::as_deref)
            .and_then(|content| content.split('\n').nth(line as usize))
            .unwrap_or_default()
            .to_string()
    }
}
