//! File-backed document store: one JSON file per user under the data directory

use async_trait::async_trait;
use pairwallet_core::error::{CoreError, CoreResult};
use pairwallet_core::{AppState, RemoteStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// User ids become file names, so only `[A-Za-z0-9_-]` is accepted
pub fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id.len() <= 128
        && user_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn check_user_id(user_id: &str) -> CoreResult<()> {
    if is_valid_user_id(user_id) {
        Ok(())
    } else {
        Err(CoreError::ValidationError {
            message: format!("invalid user id {:?}", user_id),
        })
    }
}

async fn write_then_rename(temp: &Path, target: &Path, body: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(temp, body).await?;
    tokio::fs::rename(temp, target).await
}

#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
    max_document_bytes: usize,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>, max_document_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_document_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the data directory if needed
    pub async fn ensure_root(&self) -> CoreResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn document_path(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", user_id))
    }
}

#[async_trait]
impl RemoteStore for FsDocumentStore {
    async fn load(&self, user_id: &str) -> CoreResult<Option<AppState>> {
        check_user_id(user_id)?;
        let bytes = match tokio::fs::read(self.document_path(user_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                log::error!("Failed to read state for user {}: {}", user_id, e);
                return Err(e.into());
            }
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Written to a temporary file first and renamed into place
    async fn save(&self, user_id: &str, state: &AppState) -> CoreResult<()> {
        check_user_id(user_id)?;
        let body = serde_json::to_vec(state)?;
        if body.len() > self.max_document_bytes {
            return Err(CoreError::ValidationError {
                message: format!(
                    "document is {} bytes, limit is {}",
                    body.len(),
                    self.max_document_bytes
                ),
            });
        }

        let target = self.document_path(user_id);
        let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let temp = self.root.join(format!(".{}.{}.tmp", user_id, seq));

        if let Err(e) = write_then_rename(&temp, &target, &body).await {
            log::error!("Failed to store state for user {}: {}", user_id, e);
            match tokio::fs::remove_file(&temp).await {
                Err(cleanup) if cleanup.kind() != ErrorKind::NotFound => {
                    log::warn!("Could not remove {}: {}", temp.display(), cleanup);
                }
                _ => {}
            }
            return Err(e.into());
        }

        log::debug!("Stored state for user {} ({} bytes)", user_id, body.len());
        Ok(())
    }
}
