//! Planned-item projector
//!
//! Merges planned transactions, debts with a due date and active
//! subscriptions into one date-sorted calendar view, and executes or cancels
//! entries by delegating to the mutation service.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AppState, Transaction};
use crate::mutations::{delete_transaction, save_transaction, TransactionDraft};
use crate::schedule;
use crate::time::iso_date;
use crate::types::{BillingPeriod, DebtAction, DebtType, TransactionType};

/// Source of a planned item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedItemType {
    Transaction,
    Debt,
    Subscription,
}

/// One calendar entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    /// Id of the source transaction, debt or subscription
    pub id: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub amount: f64,
    /// Income or expense from the user's point of view
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub item_type: PlannedItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

const DEBT_ICON: &str = "🤝";
const BANK_ICON: &str = "🏦";
const PAY_COLOR: &str = "#ef4444";
const RECEIVE_COLOR: &str = "#22c55e";

fn from_transaction(state: &AppState, tx: &Transaction) -> Option<PlannedItem> {
    let date = match tx.date_naive() {
        Some(date) => date,
        None => {
            log::warn!("Planned transaction {} has unreadable date {:?}", tx.id, tx.date);
            return None;
        }
    };
    let category = state.category(&tx.category_id);
    let title = if tx.note.is_empty() {
        category.map(|c| c.name.clone()).unwrap_or_default()
    } else {
        tx.note.clone()
    };
    Some(PlannedItem {
        id: tx.id.clone(),
        date,
        amount: tx.amount,
        // Savings move money out of the account
        kind: match tx.kind {
            TransactionType::Income => TransactionType::Income,
            TransactionType::Expense | TransactionType::Savings => TransactionType::Expense,
        },
        title,
        icon: category.map(|c| c.icon.clone()).unwrap_or_default(),
        color: category.map(|c| c.color.clone()).unwrap_or_default(),
        item_type: PlannedItemType::Transaction,
        account_id: Some(tx.account_id.clone()).filter(|id| !id.is_empty()),
    })
}

/// All planned items, ascending by date; same-day items keep source order
pub fn planned_items(state: &AppState) -> Vec<PlannedItem> {
    let transactions = state
        .transactions
        .iter()
        .filter(|t| t.is_planned)
        .filter_map(|t| from_transaction(state, t));

    let debts = state.debts.iter().filter_map(|d| {
        let date = d.due_date?;
        let kind = d.kind.planned_direction();
        Some(PlannedItem {
            id: d.id.clone(),
            date,
            amount: d.installment(),
            kind,
            title: d.person_name.clone(),
            icon: if d.is_bank { BANK_ICON } else { DEBT_ICON }.to_string(),
            color: match d.kind {
                DebtType::IOwe => PAY_COLOR,
                DebtType::TheyOwe => RECEIVE_COLOR,
            }
            .to_string(),
            item_type: PlannedItemType::Debt,
            account_id: None,
        })
    });

    let subscriptions = state.subscriptions.iter().filter(|s| s.is_active).map(|s| PlannedItem {
        id: s.id.clone(),
        date: s.next_payment_date,
        amount: s.amount,
        kind: TransactionType::Expense,
        title: s.name.clone(),
        icon: s.icon.clone(),
        color: s.color.clone(),
        item_type: PlannedItemType::Subscription,
        account_id: Some(s.account_id.clone()).filter(|id| !id.is_empty()),
    });

    let mut items: Vec<PlannedItem> = transactions.chain(debts).chain(subscriptions).collect();
    items.sort_by_key(|item| item.date);
    items
}

/// Items falling exactly on `date`
pub fn items_on(items: &[PlannedItem], date: NaiveDate) -> Vec<PlannedItem> {
    items.iter().filter(|item| item.date == date).cloned().collect()
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Turn a planned item into a settled transaction.
///
/// Returns `None` when the source no longer exists.
pub fn execute(
    state: &mut AppState,
    item: &PlannedItem,
    now: DateTime<Utc>,
) -> Option<Transaction> {
    let fallback_account = state.default_account_id().unwrap_or_default().to_string();

    let (draft, editing) = match item.item_type {
        PlannedItemType::Transaction => {
            let tx = state.transaction(&item.id)?;
            let mut draft = TransactionDraft::from(tx);
            draft.is_planned = false;
            draft.date = timestamp(now);
            (draft, Some(item.id.clone()))
        }
        PlannedItemType::Subscription => {
            let sub = state.subscription(&item.id)?;
            let account = if sub.account_id.is_empty() {
                fallback_account
            } else {
                sub.account_id.clone()
            };
            let date = timestamp(now);
            let draft = TransactionDraft::new(sub.amount, TransactionType::Expense, &account, &date)
                .category(&sub.category_id)
                .note(&sub.name)
                .subscription(&sub.id);
            (draft, None)
        }
        PlannedItemType::Debt => {
            let debt = state.debt(&item.id)?;
            let draft = TransactionDraft::new(
                debt.installment(),
                debt.kind.planned_direction(),
                &fallback_account,
                &timestamp(now),
            )
            .note(&debt.person_name)
            .linked_debt(&debt.id, DebtAction::Decrease);
            (draft, None)
        }
    };

    log::info!("Executing planned {:?} {}", item.item_type, item.id);
    Some(save_transaction(state, draft, editing.as_deref(), None))
}

/// Drop a planned item without recording a payment.
///
/// Returns `false` when the source no longer exists.
pub fn cancel(state: &mut AppState, item: &PlannedItem) -> bool {
    match item.item_type {
        PlannedItemType::Transaction => delete_transaction(state, &item.id).is_some(),
        PlannedItemType::Subscription => match state.subscription_mut(&item.id) {
            Some(sub) => {
                sub.is_active = false;
                true
            }
            None => false,
        },
        PlannedItemType::Debt => match state.debt_mut(&item.id) {
            Some(debt) => {
                debt.due_date = match (debt.is_monthly, debt.due_date) {
                    (true, Some(due)) => Some(schedule::advance(
                        due,
                        BillingPeriod::Monthly,
                        &mut debt.anchor_day,
                    )),
                    _ => None,
                };
                true
            }
            None => false,
        },
    }
}
