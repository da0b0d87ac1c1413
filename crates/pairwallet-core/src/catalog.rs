//! Entity management outside the transaction ledger: accounts, categories,
//! debts, subscriptions, savings goals and the profile

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{
    Account, AppState, Category, Debt, Profile, SavingsGoal, Subscription, Transaction,
};
use crate::mutations::{save_transaction, TransactionDraft};
use crate::types::TransactionType;

/// Shown for transactions whose category was deleted
pub const FALLBACK_CATEGORY_NAME: &str = "Прочее";
pub const FALLBACK_CATEGORY_ICON: &str = "📦";
pub const FALLBACK_CATEGORY_COLOR: &str = "#94a3b8";

/// Replace the item with the same id or append it
fn upsert<T, F>(items: &mut Vec<T>, item: T, same: F) -> bool
where
    F: Fn(&T, &T) -> bool,
{
    match items.iter().position(|existing| same(existing, &item)) {
        Some(pos) => {
            items[pos] = item;
            false
        }
        None => {
            items.push(item);
            true
        }
    }
}

fn remove<T, F>(items: &mut Vec<T>, matches: F) -> Option<T>
where
    F: Fn(&T) -> bool,
{
    let pos = items.iter().position(matches)?;
    Some(items.remove(pos))
}

// ==================== Accounts ====================

/// Returns true when the account was created
pub fn upsert_account(state: &mut AppState, account: Account) -> bool {
    upsert(&mut state.accounts, account, |a, b| a.id == b.id)
}

/// Delete an account; the last remaining one cannot be removed
pub fn delete_account(state: &mut AppState, id: &str) -> CoreResult<Option<Account>> {
    if state.account(id).is_none() {
        return Ok(None);
    }
    if state.accounts.len() <= 1 {
        return Err(CoreError::LastAccount);
    }
    Ok(remove(&mut state.accounts, |a| a.id == id))
}

// ==================== Categories ====================

pub fn upsert_category(state: &mut AppState, category: Category) -> bool {
    upsert(&mut state.categories, category, |a, b| a.id == b.id)
}

/// Referencing transactions keep the dangling id
pub fn delete_category(state: &mut AppState, id: &str) -> Option<Category> {
    remove(&mut state.categories, |c| c.id == id)
}

/// Name, icon and color used to render a category reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDisplay {
    pub name: String,
    pub icon: String,
    pub color: String,
}

pub fn category_display(state: &AppState, category_id: &str) -> CategoryDisplay {
    match state.category(category_id) {
        Some(c) => CategoryDisplay {
            name: c.name.clone(),
            icon: c.icon.clone(),
            color: c.color.clone(),
        },
        None => CategoryDisplay {
            name: FALLBACK_CATEGORY_NAME.to_string(),
            icon: FALLBACK_CATEGORY_ICON.to_string(),
            color: FALLBACK_CATEGORY_COLOR.to_string(),
        },
    }
}

// ==================== Debts ====================

/// A changed due date restarts the month anchor
pub fn upsert_debt(state: &mut AppState, mut debt: Debt) -> bool {
    debt.amount = debt.amount.max(0.0);
    if let Some(existing) = state.debt(&debt.id) {
        if existing.due_date != debt.due_date {
            debt.anchor_day = None;
        }
    }
    upsert(&mut state.debts, debt, |a, b| a.id == b.id)
}

/// Linked transactions keep their dangling link
pub fn delete_debt(state: &mut AppState, id: &str) -> Option<Debt> {
    remove(&mut state.debts, |d| d.id == id)
}

// ==================== Subscriptions ====================

pub fn upsert_subscription(state: &mut AppState, mut subscription: Subscription) -> bool {
    if let Some(existing) = state.subscription(&subscription.id) {
        if existing.next_payment_date != subscription.next_payment_date
            || existing.period != subscription.period
        {
            subscription.anchor_day = None;
        }
    }
    upsert(&mut state.subscriptions, subscription, |a, b| a.id == b.id)
}

pub fn delete_subscription(state: &mut AppState, id: &str) -> Option<Subscription> {
    remove(&mut state.subscriptions, |s| s.id == id)
}

// ==================== Savings goals ====================

pub fn upsert_goal(state: &mut AppState, goal: SavingsGoal) -> bool {
    upsert(&mut state.savings, goal, |a, b| a.id == b.id)
}

/// Contributing transactions are kept
pub fn delete_goal(state: &mut AppState, id: &str) -> Option<SavingsGoal> {
    remove(&mut state.savings, |g| g.id == id)
}

/// Add money to a goal and record the movement as a savings transaction
pub fn top_up_goal(
    state: &mut AppState,
    goal_id: &str,
    amount: f64,
    account_id: Option<&str>,
    date: &str,
) -> CoreResult<Transaction> {
    if amount.is_nan() || amount <= 0.0 {
        return Err(CoreError::ValidationError {
            message: format!("Top-up amount must be positive, got {}", amount),
        });
    }

    let account_id = match account_id {
        Some(id) if state.account(id).is_some() => id.to_string(),
        Some(id) => return Err(CoreError::AccountNotFound { id: id.to_string() }),
        None => state
            .default_account_id()
            .map(str::to_string)
            .ok_or_else(|| CoreError::ValidationError {
                message: "No account to take the top-up from".to_string(),
            })?,
    };
    let category_id = state
        .categories
        .iter()
        .find(|c| c.kind == TransactionType::Savings)
        .map(|c| c.id.clone())
        .unwrap_or_default();

    let goal = state.goal_mut(goal_id).ok_or_else(|| CoreError::GoalNotFound {
        id: goal_id.to_string(),
    })?;
    goal.current_amount += amount;
    let note = goal.name.clone();

    let draft = TransactionDraft::new(amount, TransactionType::Savings, &account_id, date)
        .category(&category_id)
        .note(&note);
    Ok(save_transaction(state, draft, None, None))
}

// ==================== Profile ====================

/// Replace the profile; returns the previous one
pub fn update_profile(state: &mut AppState, profile: Profile) -> Profile {
    std::mem::replace(&mut state.profile, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger;
    use crate::test_support::{account, date, debt, subscription};
    use crate::types::{BillingPeriod, DebtType};

    fn goal(id: &str) -> SavingsGoal {
        SavingsGoal {
            id: id.to_string(),
            name: "Отпуск".to_string(),
            target_amount: 100000.0,
            current_amount: 1000.0,
            icon: "🏖".to_string(),
            color: "#0ea5e9".to_string(),
        }
    }

    #[test]
    fn test_last_account_cannot_be_deleted() {
        let mut state = AppState::default();
        let result = delete_account(&mut state, "acc_cash");
        assert!(matches!(result, Err(CoreError::LastAccount)));
        assert_eq!(state.accounts.len(), 1);

        assert!(upsert_account(&mut state, account("acc_card", 500.0)));
        let removed = delete_account(&mut state, "acc_cash").unwrap();
        assert_eq!(removed.map(|a| a.id), Some("acc_cash".to_string()));
        assert!(delete_account(&mut state, "acc_missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut state = AppState::default();
        let mut cash = state.accounts[0].clone();
        cash.balance = 42.0;
        assert!(!upsert_account(&mut state, cash));
        assert_eq!(state.accounts.len(), 1);
        assert_eq!(state.accounts[0].balance, 42.0);
    }

    #[test]
    fn test_deleted_category_falls_back() {
        let mut state = AppState::default();
        assert_eq!(category_display(&state, "cat_food").name, "Продукты");
        assert!(delete_category(&mut state, "cat_food").is_some());
        let shown = category_display(&state, "cat_food");
        assert_eq!(shown.name, FALLBACK_CATEGORY_NAME);
        assert_eq!(shown.icon, FALLBACK_CATEGORY_ICON);
    }

    #[test]
    fn test_top_up_goal_records_savings() {
        let mut state = AppState::default();
        upsert_goal(&mut state, goal("goal_1"));

        let tx = top_up_goal(&mut state, "goal_1", 500.0, None, "2024-03-01").unwrap();
        assert_eq!(tx.kind, TransactionType::Savings);
        assert_eq!(tx.account_id, "acc_cash");
        assert_eq!(tx.category_id, "cat_savings");
        assert_eq!(state.savings[0].current_amount, 1500.0);
        let balance = ledger::account_running_balance(&state.accounts[0], &state.transactions);
        assert_eq!(balance, -500.0);

        assert!(matches!(
            top_up_goal(&mut state, "goal_missing", 1.0, None, "2024-03-01"),
            Err(CoreError::GoalNotFound { .. })
        ));
        assert!(matches!(
            top_up_goal(&mut state, "goal_1", 0.0, None, "2024-03-01"),
            Err(CoreError::ValidationError { .. })
        ));
        assert_eq!(state.transactions.len(), 1);
    }

    #[test]
    fn test_delete_goal_keeps_transactions() {
        let mut state = AppState::default();
        upsert_goal(&mut state, goal("goal_1"));
        top_up_goal(&mut state, "goal_1", 200.0, Some("acc_cash"), "2024-03-01").unwrap();
        assert!(delete_goal(&mut state, "goal_1").is_some());
        assert_eq!(state.transactions.len(), 1);
    }

    #[test]
    fn test_editing_schedule_dates_resets_anchor() {
        let mut state = AppState::default();
        let mut sub = subscription("sub_1", "Netflix", BillingPeriod::Monthly, date(2024, 1, 31));
        sub.anchor_day = Some(31);
        state.subscriptions.push(sub.clone());

        sub.next_payment_date = date(2024, 2, 10);
        assert!(!upsert_subscription(&mut state, sub));
        assert_eq!(state.subscriptions[0].anchor_day, None);

        let mut loan = debt("debt_1", -5.0, DebtType::IOwe);
        loan.anchor_day = Some(31);
        upsert_debt(&mut state, loan);
        assert_eq!(state.debts[0].amount, 0.0);
        assert_eq!(state.debts[0].anchor_day, Some(31));
    }

    #[test]
    fn test_update_profile() {
        let mut state = AppState::default();
        let mut profile = state.profile.clone();
        profile.name = "Аня".to_string();
        profile.include_debts_in_capital = true;
        let old = update_profile(&mut state, profile);
        assert_eq!(old.name, "");
        assert!(state.profile.include_debts_in_capital);
    }
}
