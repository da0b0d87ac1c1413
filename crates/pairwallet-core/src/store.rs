//! Session state store
//!
//! Owns the user's `AppState`. Mutations run synchronously against the
//! in-memory document, which stays authoritative; each one then hands a
//! snapshot to the debounced sync.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use pairwallet_config::SyncConfig;

use crate::error::{DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::ledger;
use crate::migrate::migrate_legacy;
use crate::models::{AppState, Transaction};
use crate::mutations::{self, TransactionDraft};
use crate::planner::{self, PlannedItem};
use crate::remote::RemoteStore;
use crate::reports::LedgerSummary;
use crate::sync::{DebouncedSync, SyncStatus};

/// Result of the initial load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored document adopted; `migrated` when it was upgraded on the way
    Loaded { migrated: bool },
    /// Nothing stored yet, the default state is kept
    Empty,
    /// Load took longer than the configured timeout
    TimedOut,
    /// Load failed; the error was logged
    Failed,
}

pub struct StateStore {
    user_id: String,
    state: AppState,
    remote: Arc<dyn RemoteStore>,
    sync: DebouncedSync,
    load_timeout: Duration,
}

impl StateStore {
    pub fn new(remote: Arc<dyn RemoteStore>, user_id: &str, config: &SyncConfig) -> Self {
        Self {
            user_id: user_id.to_string(),
            state: AppState::default(),
            sync: DebouncedSync::new(
                Arc::clone(&remote),
                user_id,
                Duration::from_millis(config.debounce_ms),
            ),
            remote,
            load_timeout: Duration::from_millis(config.load_timeout_ms),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Fetch the stored document, giving up after the load timeout.
    ///
    /// On timeout or error the current state is kept so the session can
    /// proceed offline.
    pub async fn load(&mut self) -> LoadOutcome {
        let context = ErrorContext::new("load_state").with_user_id(&self.user_id);
        let loaded = tokio::time::timeout(self.load_timeout, self.remote.load(&self.user_id)).await;

        match loaded {
            Ok(Ok(Some(mut state))) => {
                let report = migrate_legacy(&mut state);
                let migrated = report.from_version < state.schema_version;
                self.state = state;
                log::info!(
                    "Loaded state for user {} ({} transactions)",
                    self.user_id,
                    self.state.transactions.len()
                );
                if migrated {
                    self.sync.schedule(self.state.clone());
                }
                LoadOutcome::Loaded { migrated }
            }
            Ok(Ok(None)) => {
                log::info!("No stored state for user {}, starting fresh", self.user_id);
                LoadOutcome::Empty
            }
            Ok(Err(error)) => {
                DefaultErrorLogger.log_error(&error, &context);
                LoadOutcome::Failed
            }
            Err(_) => {
                let message = format!(
                    "State load exceeded {:?}, continuing with local state",
                    self.load_timeout
                );
                DefaultErrorLogger.log_warning(&message, &context);
                LoadOutcome::TimedOut
            }
        }
    }

    fn commit(&self) {
        self.sync.schedule(self.state.clone());
    }

    pub fn save_transaction(
        &mut self,
        draft: TransactionDraft,
        editing_id: Option<&str>,
        new_debt_name: Option<&str>,
    ) -> Transaction {
        let tx = mutations::save_transaction(&mut self.state, draft, editing_id, new_debt_name);
        self.commit();
        tx
    }

    pub fn delete_transaction(&mut self, id: &str) -> Option<Transaction> {
        let removed = mutations::delete_transaction(&mut self.state, id)?;
        self.commit();
        Some(removed)
    }

    pub fn execute_planned(
        &mut self,
        item: &PlannedItem,
        now: DateTime<Utc>,
    ) -> Option<Transaction> {
        let tx = planner::execute(&mut self.state, item, now)?;
        self.commit();
        Some(tx)
    }

    pub fn cancel_planned(&mut self, item: &PlannedItem) -> bool {
        let cancelled = planner::cancel(&mut self.state, item);
        if cancelled {
            self.commit();
        }
        cancelled
    }

    /// Apply any other edit, e.g. a catalog operation, and schedule a sync
    pub fn update<R>(&mut self, edit: impl FnOnce(&mut AppState) -> R) -> R {
        let result = edit(&mut self.state);
        self.commit();
        result
    }

    pub fn summary(&self, today: NaiveDate) -> LedgerSummary {
        ledger::summary(&self.state, today)
    }

    pub fn planned_items(&self) -> Vec<PlannedItem> {
        planner::planned_items(&self.state)
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    pub fn subscribe_sync(&self) -> watch::Receiver<SyncStatus> {
        self.sync.subscribe()
    }

    /// Save the current state without waiting for the debounce delay
    pub async fn flush(&self) -> SyncStatus {
        self.sync.flush(&self.state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::remote::MemoryRemoteStore;
    use crate::test_support::account;
    use crate::types::TransactionType;
    use async_trait::async_trait;

    fn config() -> SyncConfig {
        SyncConfig {
            debounce_ms: 1500,
            load_timeout_ms: 5000,
            ..SyncConfig::default()
        }
    }

    struct SlowStore;

    #[async_trait]
    impl RemoteStore for SlowStore {
        async fn load(&self, _user_id: &str) -> crate::error::CoreResult<Option<AppState>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn save(&self, _user_id: &str, _state: &AppState) -> crate::error::CoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_times_out_to_default() {
        let mut store = StateStore::new(Arc::new(SlowStore), "u1", &config());
        assert_eq!(store.load().await, LoadOutcome::TimedOut);
        assert_eq!(store.state(), &AppState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_failure_keeps_local_state() {
        let remote = Arc::new(MemoryRemoteStore::new());
        remote.set_failing(true);
        let mut store = StateStore::new(remote, "u1", &config());
        assert_eq!(store.load().await, LoadOutcome::Failed);
        assert_eq!(store.state().accounts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_adopts_and_migrates() {
        let mut stored = AppState::default();
        stored.schema_version = 0;
        stored.accounts.push(account("acc_card", 100.0));
        let remote = Arc::new(MemoryRemoteStore::with_document("u1", stored));

        let mut store = StateStore::new(remote.clone(), "u1", &config());
        assert_eq!(store.load().await, LoadOutcome::Loaded { migrated: true });
        assert_eq!(store.state().accounts.len(), 2);

        // The upgraded document is written back
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let saved = remote.document("u1").unwrap();
        assert_eq!(saved.schema_version, crate::models::CURRENT_SCHEMA_VERSION);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_empty() {
        let mut store = StateStore::new(Arc::new(MemoryRemoteStore::new()), "u1", &config());
        assert_eq!(store.load().await, LoadOutcome::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_schedule_one_save() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let mut store = StateStore::new(remote.clone(), "u1", &config());

        let first = store.save_transaction(
            TransactionDraft::new(200.0, TransactionType::Income, "acc_cash", "2024-05-01"),
            None,
            None,
        );
        store.update(|state| catalog::upsert_account(state, account("acc_card", 10.0)));
        store.delete_transaction(&first.id);
        assert_eq!(store.sync_status(), SyncStatus::Pending);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(remote.save_count(), 1);
        let saved = remote.document("u1").unwrap();
        assert!(saved.transactions.is_empty());
        assert_eq!(saved.accounts.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_status_is_observable() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let mut store = StateStore::new(remote.clone(), "u1", &config());
        let mut status = store.subscribe_sync();
        assert_eq!(*status.borrow_and_update(), SyncStatus::Idle);

        store.update(|state| state.profile.name = "Аня".to_string());
        assert!(status.has_changed().unwrap());
        assert_eq!(*status.borrow_and_update(), SyncStatus::Pending);

        assert_eq!(store.flush().await, SyncStatus::Saved);
        assert_eq!(*status.borrow_and_update(), SyncStatus::Saved);
        assert_eq!(remote.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_delete_does_not_sync() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let mut store = StateStore::new(remote.clone(), "u1", &config());
        assert!(store.delete_transaction("tx_missing").is_none());
        assert_eq!(store.sync_status(), SyncStatus::Idle);
    }
}
