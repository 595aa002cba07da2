//! Filesystem-based output sink implementation

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::core::error::{Error, Result};
use crate::generation::{Artifact, OutputSink};

/// Output sink that writes artifacts below a root directory, overwriting
/// existing files
pub struct FileSystemOutput {
    root: PathBuf,
}

impl FileSystemOutput {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Write {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl OutputSink for FileSystemOutput {
    async fn write(&self, artifact: &Artifact) -> Result<PathBuf> {
        let path = self.root.join(&artifact.path);

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(write_error(parent))?;
        }

        let mut file = fs::File::create(&path).await.map_err(write_error(&path))?;
        file.write_all(&artifact.content)
            .await
            .map_err(write_error(&path))?;
        file.flush().await.map_err(write_error(&path))?;

        // Set permissions if specified (Unix only)
        #[cfg(unix)]
        if let Some(mode) = artifact.permissions {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode);
            fs::set_permissions(&path, permissions)
                .await
                .map_err(write_error(&path))?;
        }

        tracing::debug!(path = %path.display(), bytes = artifact.content.len(), "Wrote file");
        Ok(path)
    }
}
