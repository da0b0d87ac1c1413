//! Upgrade of legacy state documents
//!
//! Version 0 documents encode transaction provenance as a note prefix and
//! may link a subscription payment only by the subscription's name. Loading
//! moves both into typed fields so nothing downstream matches on text.

use crate::models::{AppState, CURRENT_SCHEMA_VERSION};
use crate::types::TransactionOrigin;

/// Note prefix of legacy subscription payments
pub const LEGACY_SUBSCRIPTION_MARKER: &str = "[ПОДПИСКА]";
/// Note prefix of legacy debt transactions
pub const LEGACY_DEBT_MARKER: &str = "[ДОЛГ]";

/// What a migration changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub notes_rewritten: usize,
    pub subscriptions_resolved: usize,
}

fn strip_marker<'a>(note: &'a str, marker: &str) -> Option<&'a str> {
    note.trim_start().strip_prefix(marker).map(str::trim_start)
}

/// Bring a document up to the current schema; current documents pass through
pub fn migrate_legacy(state: &mut AppState) -> MigrationReport {
    let mut report = MigrationReport {
        from_version: state.schema_version,
        ..MigrationReport::default()
    };
    if state.schema_version >= CURRENT_SCHEMA_VERSION {
        return report;
    }

    let subscriptions: Vec<(String, String)> = state
        .subscriptions
        .iter()
        .map(|s| (s.id.clone(), s.name.trim().to_lowercase()))
        .collect();

    for tx in &mut state.transactions {
        if let Some(rest) = strip_marker(&tx.note, LEGACY_SUBSCRIPTION_MARKER) {
            let rest = rest.to_string();
            if tx.subscription_id.is_none() {
                let wanted = rest.trim().to_lowercase();
                if let Some((id, _)) = subscriptions.iter().find(|(_, name)| *name == wanted) {
                    tx.subscription_id = Some(id.clone());
                    report.subscriptions_resolved += 1;
                } else {
                    log::warn!("Legacy subscription payment {} matches no subscription", tx.id);
                }
            }
            tx.note = rest;
            tx.origin = TransactionOrigin::Subscription;
            report.notes_rewritten += 1;
        } else if let Some(rest) = strip_marker(&tx.note, LEGACY_DEBT_MARKER) {
            tx.note = rest.to_string();
            tx.origin = TransactionOrigin::Debt;
            report.notes_rewritten += 1;
        } else if tx.subscription_id.is_some() {
            tx.origin = TransactionOrigin::Subscription;
        } else if tx.linked_debt_id.is_some() {
            tx.origin = TransactionOrigin::Debt;
        }
    }

    state.schema_version = CURRENT_SCHEMA_VERSION;
    log::info!(
        "Migrated state from schema {} ({} notes rewritten, {} subscriptions resolved)",
        report.from_version, report.notes_rewritten, report.subscriptions_resolved
    );
    report
}
