//! Core ledger processing and business logic
//!
//! The state document (`models`), the pure ledger engine over it (`ledger`),
//! the transaction mutation service that keeps debts and subscriptions
//! consistent (`mutations`), the planner calendar (`planner`) and the
//! session plumbing that loads and syncs the document (`store`, `sync`).

pub mod catalog;
pub mod chat;
pub mod error;
pub mod host;
pub mod ledger;
pub mod migrate;
pub mod models;
pub mod mutations;
pub mod planner;
pub mod remote;
pub mod reports;
pub mod schedule;
pub mod session;
pub mod store;
pub mod sync;
pub mod time;
pub mod types;

#[cfg(test)]
mod test_support;

pub use error::{CoreError, CoreResult, ErrorSeverity};
pub use models::{
    Account, AppState, Category, Debt, Profile, SavingsGoal, Subscription, Transaction,
    CURRENT_SCHEMA_VERSION,
};
pub use mutations::{delete_transaction, save_transaction, TransactionDraft};
pub use planner::{PlannedItem, PlannedItemType};
pub use remote::{HttpRemoteStore, MemoryRemoteStore, RemoteStore};
pub use reports::LedgerSummary;
pub use store::{LoadOutcome, StateStore};
pub use sync::{DebouncedSync, SyncStatus};
pub use time::ReportPeriod;
pub use types::{
    AccountKind, BillingPeriod, DebtAction, DebtType, TransactionOrigin, TransactionType,
};
