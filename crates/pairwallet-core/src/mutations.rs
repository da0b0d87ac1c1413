//! Transaction mutation service
//!
//! The single place where transactions are created, edited and deleted, and
//! where the side effects on linked debts and subscriptions are applied and
//! reversed.
//!
//! Amount effects on a debt are re-applied on every edit (old effect reversed
//! first). Every save of a subscription payment advances the subscription by
//! one period, and every save of a `decrease` against a monthly debt advances
//! its due date by one month. Deleting a payment regresses the subscription,
//! but the due date of a monthly debt only moves forward.

use pairwallet_utils::generate_id;

use crate::models::{AppState, Debt, Transaction};
use crate::schedule;
use crate::types::{BillingPeriod, DebtAction, DebtType, TransactionOrigin, TransactionType};

/// Transaction fields as entered; the id is assigned by [`save_transaction`]
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub amount: f64,
    pub category_id: String,
    pub account_id: String,
    pub date: String,
    pub note: String,
    pub kind: TransactionType,
    pub is_planned: bool,
    pub is_joint: bool,
    pub linked_debt_id: Option<String>,
    pub debt_action: Option<DebtAction>,
    pub subscription_id: Option<String>,
}

impl TransactionDraft {
    pub fn new(amount: f64, kind: TransactionType, account_id: &str, date: &str) -> Self {
        Self {
            amount,
            category_id: String::new(),
            account_id: account_id.to_string(),
            date: date.to_string(),
            note: String::new(),
            kind,
            is_planned: false,
            is_joint: false,
            linked_debt_id: None,
            debt_action: None,
            subscription_id: None,
        }
    }

    pub fn category(mut self, category_id: &str) -> Self {
        self.category_id = category_id.to_string();
        self
    }

    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    pub fn planned(mut self, is_planned: bool) -> Self {
        self.is_planned = is_planned;
        self
    }

    pub fn joint(mut self, is_joint: bool) -> Self {
        self.is_joint = is_joint;
        self
    }

    /// Link to an existing debt
    pub fn linked_debt(mut self, debt_id: &str, action: DebtAction) -> Self {
        self.linked_debt_id = Some(debt_id.to_string());
        self.debt_action = Some(action);
        self
    }

    /// Set the debt action without a link, used together with a new debt name
    pub fn debt_action(mut self, action: DebtAction) -> Self {
        self.debt_action = Some(action);
        self
    }

    pub fn subscription(mut self, subscription_id: &str) -> Self {
        self.subscription_id = Some(subscription_id.to_string());
        self
    }
}

impl From<&Transaction> for TransactionDraft {
    fn from(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount,
            category_id: tx.category_id.clone(),
            account_id: tx.account_id.clone(),
            date: tx.date.clone(),
            note: tx.note.clone(),
            kind: tx.kind,
            is_planned: tx.is_planned,
            is_joint: tx.is_joint,
            linked_debt_id: tx.linked_debt_id.clone(),
            debt_action: tx.debt_action,
            subscription_id: tx.subscription_id.clone(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Create or edit a transaction and apply its side effects.
///
/// `editing_id` names the transaction being replaced. `new_debt_name` opens
/// a new debt when the draft has no existing debt link and its action is
/// `Increase`. Drafts are assumed valid.
pub fn save_transaction(
    state: &mut AppState,
    draft: TransactionDraft,
    editing_id: Option<&str>,
    new_debt_name: Option<&str>,
) -> Transaction {
    let previous = editing_id.and_then(|id| state.transaction(id).cloned());

    // Undo the old amount effect before anything new is applied
    if let Some(old) = &previous {
        reverse_debt_effect(state, old);
    }

    let id = match editing_id {
        Some(id) => id.to_string(),
        None => generate_id("tx"),
    };

    let subscription_id = non_empty(draft.subscription_id);
    if let Some(subscription_id) = subscription_id.as_deref() {
        advance_subscription(state, subscription_id);
    }

    let mut linked_debt_id = non_empty(draft.linked_debt_id);
    let debt_action = draft.debt_action;

    let applied = match (linked_debt_id.as_deref(), debt_action) {
        (Some(debt_id), Some(action)) => match state.debt_mut(debt_id) {
            Some(debt) => {
                debt.adjust(action.delta(draft.amount));
                if action == DebtAction::Decrease && debt.is_monthly {
                    advance_due_date(debt);
                }
                true
            }
            None => {
                log::warn!("Transaction {} links to missing debt {}", id, debt_id);
                false
            }
        },
        _ => false,
    };

    if !applied && debt_action == Some(DebtAction::Increase) {
        if let Some(name) = new_debt_name.map(str::trim).filter(|n| !n.is_empty()) {
            let debt = Debt {
                id: generate_id("debt"),
                person_name: name.to_string(),
                amount: draft.amount,
                kind: DebtType::opened_by(draft.kind),
                is_bank: false,
                is_monthly: false,
                due_date: None,
                end_date: None,
                date: draft.date.clone(),
                description: draft.note.clone(),
                monthly_payment: None,
                anchor_day: None,
            };
            log::debug!("Opened debt {} ({}) for {}", debt.id, debt.kind, debt.person_name);
            linked_debt_id = Some(debt.id.clone());
            state.debts.push(debt);
        }
    }

    let origin = if subscription_id.is_some() {
        TransactionOrigin::Subscription
    } else if linked_debt_id.is_some() {
        TransactionOrigin::Debt
    } else {
        TransactionOrigin::Manual
    };

    let tx = Transaction {
        id,
        amount: draft.amount,
        category_id: draft.category_id,
        account_id: draft.account_id,
        date: draft.date,
        note: draft.note,
        kind: draft.kind,
        is_planned: draft.is_planned,
        is_joint: draft.is_joint,
        linked_debt_id,
        debt_action,
        subscription_id,
        origin,
    };

    match state.transactions.iter().position(|t| t.id == tx.id) {
        Some(pos) => state.transactions[pos] = tx.clone(),
        None => state.transactions.push(tx.clone()),
    }

    log::debug!(
        "Saved transaction {} ({} {}, origin {:?}, edit: {})",
        tx.id,
        tx.kind,
        tx.amount,
        tx.origin,
        previous.is_some()
    );
    tx
}

/// Remove a transaction and reverse its side effects; absent ids are a no-op
pub fn delete_transaction(state: &mut AppState, id: &str) -> Option<Transaction> {
    let pos = state.transactions.iter().position(|t| t.id == id)?;
    let tx = state.transactions.remove(pos);

    if let Some(subscription_id) = tx.subscription_id.as_deref() {
        regress_subscription(state, subscription_id);
    }
    reverse_debt_effect(state, &tx);

    log::debug!("Deleted transaction {}", tx.id);
    Some(tx)
}

/// Rolling installment: one month forward, never reversed
fn advance_due_date(debt: &mut Debt) {
    if let Some(due) = debt.due_date {
        debt.due_date = Some(schedule::advance(due, BillingPeriod::Monthly, &mut debt.anchor_day));
    }
}

/// Undo the amount effect a transaction had on its linked debt
fn reverse_debt_effect(state: &mut AppState, tx: &Transaction) {
    if let Some((debt_id, action)) = tx.debt_link() {
        if let Some(debt) = state.debt_mut(debt_id) {
            debt.adjust(-action.delta(tx.amount));
        }
    }
}

pub(crate) fn advance_subscription(state: &mut AppState, subscription_id: &str) {
    if let Some(sub) = state.subscription_mut(subscription_id) {
        sub.next_payment_date =
            schedule::advance(sub.next_payment_date, sub.period, &mut sub.anchor_day);
    }
}

pub(crate) fn regress_subscription(state: &mut AppState, subscription_id: &str) {
    if let Some(sub) = state.subscription_mut(subscription_id) {
        sub.next_payment_date =
            schedule::regress(sub.next_payment_date, sub.period, &mut sub.anchor_day);
    }
}

// ==================== Tests ====================
