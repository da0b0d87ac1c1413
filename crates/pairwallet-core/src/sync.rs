//! Debounced persistence of the state document
//!
//! A single pending-write slot: each scheduled snapshot replaces the one
//! before it, and only the last snapshot of a burst of edits is sent once
//! the delay has passed without another edit.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::AppState;
use crate::remote::RemoteStore;

/// Passive indicator shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Idle,
    /// Waiting out the debounce delay
    Pending,
    Saving,
    Saved,
    /// The last save failed; the next edit retries
    Error,
}

pub struct DebouncedSync {
    store: Arc<dyn RemoteStore>,
    user_id: String,
    delay: Duration,
    status: Arc<watch::Sender<SyncStatus>>,
    pending: Mutex<Option<JoinHandle<()>>>,
    logger: Arc<dyn ErrorLogger>,
}

impl DebouncedSync {
    pub fn new(store: Arc<dyn RemoteStore>, user_id: &str, delay: Duration) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            store,
            user_id: user_id.to_string(),
            delay,
            status: Arc::new(status),
            pending: Mutex::new(None),
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Watch status changes
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending write with `snapshot`, to be saved after the delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, snapshot: AppState) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                let error = CoreError::InternalError {
                    message: "sync scheduled outside a tokio runtime".to_string(),
                };
                let context = ErrorContext::new("schedule_sync").with_user_id(&self.user_id);
                self.logger.log_error(&error, &context);
                self.status.send_replace(SyncStatus::Error);
                return;
            }
        };

        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        self.status.send_replace(SyncStatus::Pending);

        let store = Arc::clone(&self.store);
        let status = Arc::clone(&self.status);
        let logger = Arc::clone(&self.logger);
        let user_id = self.user_id.clone();
        let delay = self.delay;

        *pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            status.send_replace(SyncStatus::Saving);
            let outcome = save_snapshot(store.as_ref(), &user_id, &snapshot, logger.as_ref()).await;
            status.send_replace(outcome);
        }));
    }

    /// Drop the pending write and save `snapshot` now
    pub async fn flush(&self, snapshot: &AppState) -> SyncStatus {
        self.cancel_pending();
        self.status.send_replace(SyncStatus::Saving);
        let outcome =
            save_snapshot(self.store.as_ref(), &self.user_id, snapshot, self.logger.as_ref()).await;
        self.status.send_replace(outcome);
        outcome
    }

    fn cancel_pending(&self) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl Drop for DebouncedSync {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

async fn save_snapshot(
    store: &dyn RemoteStore,
    user_id: &str,
    snapshot: &AppState,
    logger: &dyn ErrorLogger,
) -> SyncStatus {
    match store.save(user_id, snapshot).await {
        Ok(()) => {
            log::debug!(
                "State for user {} saved ({} transactions)",
                user_id,
                snapshot.transactions.len()
            );
            SyncStatus::Saved
        }
        Err(error) => {
            logger.log_error(&error, &ErrorContext::new("save_state").with_user_id(user_id));
            SyncStatus::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::remote::MemoryRemoteStore;

    #[derive(Default)]
    struct RecordingLogger {
        errors: Mutex<Vec<(ErrorCode, String)>>,
    }

    impl ErrorLogger for RecordingLogger {
        fn log_error(&self, error: &CoreError, context: &ErrorContext) {
            self.errors.lock().unwrap().push((error.code(), context.operation.clone()));
        }

        fn log_warning(&self, _message: &str, _context: &ErrorContext) {}
    }

    fn named(name: &str) -> AppState {
        let mut state = AppState::default();
        state.profile.name = name.to_string();
        state
    }

    fn setup() -> (Arc<MemoryRemoteStore>, DebouncedSync) {
        let store = Arc::new(MemoryRemoteStore::new());
        let sync = DebouncedSync::new(store.clone(), "u1", Duration::from_millis(1500));
        (store, sync)
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_after_delay() {
        let (store, sync) = setup();
        assert_eq!(sync.status(), SyncStatus::Idle);

        sync.schedule(named("a"));
        assert_eq!(sync.status(), SyncStatus::Pending);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(store.save_count(), 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(sync.status(), SyncStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_edit_supersedes_pending() {
        let (store, sync) = setup();

        sync.schedule(named("first"));
        tokio::time::sleep(Duration::from_millis(1000)).await;
        sync.schedule(named("second"));

        // The first write would have fired at 1500ms
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(store.save_count(), 0);
        assert_eq!(sync.status(), SyncStatus::Pending);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.document("u1").unwrap().profile.name, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_only_changes_status() {
        let (store, sync) = setup();
        store.set_failing(true);
        let mut status = sync.subscribe();

        sync.schedule(named("a"));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(sync.status(), SyncStatus::Error);
        assert!(status.has_changed().unwrap());

        // The next cycle resends the latest state
        store.set_failing(false);
        sync.schedule(named("b"));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(sync.status(), SyncStatus::Saved);
        assert_eq!(store.document("u1").unwrap().profile.name, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_immediately() {
        let (store, sync) = setup();
        sync.schedule(named("pending"));
        let outcome = sync.flush(&named("flushed")).await;
        assert_eq!(outcome, SyncStatus::Saved);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.document("u1").unwrap().profile.name, "flushed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_reach_custom_logger() {
        let store = Arc::new(MemoryRemoteStore::new());
        store.set_failing(true);
        let logger = Arc::new(RecordingLogger::default());
        let sync = DebouncedSync::new(store.clone(), "u1", Duration::from_millis(1500))
            .with_logger(logger.clone());

        sync.schedule(named("a"));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(sync.status(), SyncStatus::Error);
        let errors = logger.errors.lock().unwrap().clone();
        assert_eq!(errors, vec![(ErrorCode::RemoteError, "save_state".to_string())]);
    }

    #[test]
    fn test_schedule_outside_runtime_reports_error() {
        let (store, sync) = setup();
        sync.schedule(named("a"));
        assert_eq!(sync.status(), SyncStatus::Error);
        assert_eq!(store.save_count(), 0);
    }
}
