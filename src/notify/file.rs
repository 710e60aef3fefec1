//! File notifier. Overwrites a local file with the content.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::notify::Notifier;

pub struct FileNotifier {
    path: PathBuf,
}

impl FileNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    fn name(&self) -> &str {
        "file"
    }

    async fn deliver(&self, content: &str) -> Result<(), NotifyError> {
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| NotifyError::Write {
                path: self.path.display().to_string(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), bytes = content.len(), "Digest written");
        Ok(())
    }
}
