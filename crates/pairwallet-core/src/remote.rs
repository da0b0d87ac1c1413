//! Remote persistence of whole state documents

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::models::AppState;

/// Whole-document store keyed by user id. Last write wins.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `None` when the user has no stored document yet
    async fn load(&self, user_id: &str) -> CoreResult<Option<AppState>>;

    async fn save(&self, user_id: &str, state: &AppState) -> CoreResult<()>;
}

/// Response body of `GET /user-state/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateEnvelope {
    pub state: Option<AppState>,
}

/// Response body of `POST /user-state/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAck {
    pub success: bool,
}

const USER_AGENT: &str = concat!("pairwallet/", env!("CARGO_PKG_VERSION"));

/// Client for the state server's `/user-state/{id}` endpoints
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(base_url: &str, timeout: Duration) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, user_id: &str) -> String {
        format!("{}/user-state/{}", self.base_url, user_id)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn load(&self, user_id: &str) -> CoreResult<Option<AppState>> {
        let response = self.client.get(self.url(user_id)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CoreError::Remote {
                message: format!("load returned {}", response.status()),
            });
        }
        let envelope: StateEnvelope = response.json().await?;
        Ok(envelope.state)
    }

    async fn save(&self, user_id: &str, state: &AppState) -> CoreResult<()> {
        let response = self.client.post(self.url(user_id)).json(state).send().await?;
        if !response.status().is_success() {
            return Err(CoreError::Remote {
                message: format!("save returned {}", response.status()),
            });
        }
        Ok(())
    }
}

/// Process-local store, used offline and in tests
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    documents: Mutex<HashMap<String, AppState>>,
    fail: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(user_id: &str, state: AppState) -> Self {
        let store = Self::default();
        if let Ok(mut documents) = store.documents.lock() {
            documents.insert(user_id.to_string(), state);
        }
        store
    }

    /// Make every following call fail with a remote error
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn document(&self, user_id: &str) -> Option<AppState> {
        self.documents.lock().ok()?.get(user_id).cloned()
    }

    fn check(&self) -> CoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Remote {
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn load(&self, user_id: &str) -> CoreResult<Option<AppState>> {
        self.check()?;
        Ok(self.document(user_id))
    }

    async fn save(&self, user_id: &str, state: &AppState) -> CoreResult<()> {
        self.check()?;
        let mut documents = self.documents.lock().map_err(|_| CoreError::InternalError {
            message: "memory store lock poisoned".to_string(),
        })?;
        documents.insert(user_id.to_string(), state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryRemoteStore::new();
        assert!(store.load("u1").await.unwrap().is_none());

        let state = AppState::default();
        store.save("u1", &state).await.unwrap();
        assert_eq!(store.load("u1").await.unwrap(), Some(state));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_failure() {
        let store = MemoryRemoteStore::new();
        store.set_failing(true);
        let err = store.save("u1", &AppState::default()).await.unwrap_err();
        assert!(matches!(err, CoreError::Remote { .. }));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_envelope_null_state() {
        let envelope: StateEnvelope = serde_json::from_str(r#"{"state": null}"#).unwrap();
        assert!(envelope.state.is_none());
    }

    #[test]
    fn test_http_store_url() {
        let store = HttpRemoteStore::new("http://localhost:3001/", Duration::from_secs(5)).unwrap();
        assert_eq!(store.url("42"), "http://localhost:3001/user-state/42");
    }
}
