//! Client session: the state store bound to the host's user

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Arc, Mutex};

use pairwallet_config::SyncConfig;

use crate::host::{HostBridge, GUEST_USER_ID};
use crate::models::Transaction;
use crate::planner::{items_on, PlannedItem};
use crate::remote::RemoteStore;
use crate::store::{LoadOutcome, StateStore};

pub struct ClientSession {
    host: Arc<dyn HostBridge>,
    store: StateStore,
    selected_date: Arc<Mutex<Option<NaiveDate>>>,
}

impl ClientSession {
    pub fn new(
        host: Arc<dyn HostBridge>,
        remote: Arc<dyn RemoteStore>,
        config: &SyncConfig,
    ) -> Self {
        let user_id = host.current_user_id().unwrap_or_else(|| {
            log::warn!("Host provided no user id, using {}", GUEST_USER_ID);
            GUEST_USER_ID.to_string()
        });
        Self {
            host,
            store: StateStore::new(remote, &user_id, config),
            selected_date: Arc::new(Mutex::new(None)),
        }
    }

    /// Load the stored state
    pub async fn start(&mut self) -> LoadOutcome {
        self.store.load().await
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date.lock().ok().and_then(|d| *d)
    }

    /// Select a planner date; the host's back button clears the selection
    pub fn select_date(&self, date: NaiveDate) {
        if let Ok(mut selected) = self.selected_date.lock() {
            *selected = Some(date);
        }
        let selection = Arc::clone(&self.selected_date);
        self.host.on_back(Box::new(move || {
            if let Ok(mut selected) = selection.lock() {
                *selected = None;
            }
        }));
    }

    pub fn clear_selection(&self) {
        if let Ok(mut selected) = self.selected_date.lock() {
            *selected = None;
        }
        self.host.clear_back();
    }

    /// Planned items on the selected date, or all of them
    pub fn visible_items(&self) -> Vec<PlannedItem> {
        let items = self.store.planned_items();
        match self.selected_date() {
            Some(date) => items_on(&items, date),
            None => items,
        }
    }

    pub fn execute(&mut self, item: &PlannedItem, now: DateTime<Utc>) -> Option<Transaction> {
        let tx = self.store.execute_planned(item, now)?;
        self.host.haptic_success();
        Some(tx)
    }

    pub fn cancel(&mut self, item: &PlannedItem) -> bool {
        self.store.cancel_planned(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::remote::MemoryRemoteStore;
    use crate::test_support::{date, subscription};
    use crate::types::BillingPeriod;
    use chrono::TimeZone;

    fn session(host: Arc<HeadlessHost>) -> ClientSession {
        let remote = Arc::new(MemoryRemoteStore::new());
        let mut session = ClientSession::new(host, remote, &SyncConfig::default());
        session.store_mut().update(|state| {
            state
                .subscriptions
                .push(subscription("sub_1", "Netflix", BillingPeriod::Monthly, date(2024, 1, 15)))
        });
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_uses_host_user_or_guest() {
        let known = ClientSession::new(
            Arc::new(HeadlessHost::new(Some("777"))),
            Arc::new(MemoryRemoteStore::new()),
            &SyncConfig::default(),
        );
        assert_eq!(known.store().user_id(), "777");

        let guest = ClientSession::new(
            Arc::new(HeadlessHost::new(None)),
            Arc::new(MemoryRemoteStore::new()),
            &SyncConfig::default(),
        );
        assert_eq!(guest.store().user_id(), GUEST_USER_ID);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_fires_haptic() {
        let host = Arc::new(HeadlessHost::new(Some("1")));
        let mut session = session(host.clone());
        let item = session.visible_items().remove(0);

        let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        assert!(session.execute(&item, now).is_some());
        assert_eq!(host.haptic_count(), 1);

        session.store_mut().update(|state| state.subscriptions.clear());
        assert!(session.execute(&item, now).is_none());
        assert_eq!(host.haptic_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_clears_selected_date() {
        let host = Arc::new(HeadlessHost::new(Some("1")));
        let session = session(host.clone());

        session.select_date(date(2024, 1, 16));
        assert!(session.visible_items().is_empty());
        assert!(host.has_back_handler());

        assert!(host.press_back());
        assert_eq!(session.selected_date(), None);
        assert_eq!(session.visible_items().len(), 1);
    }
}
