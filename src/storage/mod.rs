//! Durable local cache for the bearer token.
//!
//! Write-only from the session's point of view: the token is persisted so
//! other tooling can pick it up across reloads, but it is never read back
//! into session state. Restoration relies on the provider's own auth-state
//! replay.

use anyhow::Result;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn store(&self, token: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Token cache backed by a single file, owner-readable only.
pub struct FileTokenCache {
    path: PathBuf,
}

impl FileTokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenCache for FileTokenCache {
    async fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&self.path, token).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        debug!("token cached at {}", self.path.display());

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("token cache cleared at {}", self.path.display());
                Ok(())
            }
            // Clearing an empty cache is a no-op.
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
