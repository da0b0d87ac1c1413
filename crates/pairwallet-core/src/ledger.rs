//! Ledger engine: derived balances and aggregates
//!
//! Every function here is a pure read over a state snapshot. Nothing is
//! cached; callers recompute on each read.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{Account, AppState, Debt, Transaction};
use crate::reports::{AccountBalance, CategoryTotal, DebtTotals, LedgerSummary, PeriodTotals};
use crate::time::ReportPeriod;
use crate::types::{DebtType, TransactionType};

/// Sum that starts from `+0.0`, so empty inputs never report `-0.0`
fn total(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |acc, v| acc + v)
}

/// Baseline plus the signed sum of settled transactions on the account.
///
/// Savings transactions subtract like expenses: the money moved into a goal.
pub fn account_running_balance(account: &Account, transactions: &[Transaction]) -> f64 {
    account.balance
        + total(
            transactions
                .iter()
                .filter(|t| t.is_settled() && t.account_id == account.id)
                .map(Transaction::signed_amount),
        )
}

/// Running balances of all accounts, in account order
pub fn account_balances(state: &AppState) -> Vec<AccountBalance> {
    state
        .accounts
        .iter()
        .map(|a| AccountBalance {
            account_id: a.id.clone(),
            name: a.name.clone(),
            balance: account_running_balance(a, &state.transactions),
        })
        .collect()
}

/// Goal balances plus every savings transaction, planned ones included
pub fn total_savings_value(state: &AppState) -> f64 {
    let goals = total(state.savings.iter().map(|g| g.current_amount));
    let moved = total(
        state
            .transactions
            .iter()
            .filter(|t| t.kind == TransactionType::Savings)
            .map(|t| t.amount),
    );
    goals + moved
}

/// Outstanding amounts by side
pub fn debt_totals(debts: &[Debt]) -> DebtTotals {
    debts.iter().fold(DebtTotals::default(), |mut totals, d| {
        match (d.kind, d.is_bank) {
            (DebtType::TheyOwe, _) => totals.they_owe += d.amount,
            (DebtType::IOwe, true) => totals.i_owe_bank += d.amount,
            (DebtType::IOwe, false) => totals.i_owe += d.amount,
        }
        totals
    })
}

/// What people owe me minus what I owe people; bank debt is excluded
pub fn net_debt(debts: &[Debt]) -> f64 {
    let totals = debt_totals(debts);
    totals.they_owe - totals.i_owe
}

/// Accounts plus savings, plus net debt when the profile opts in
pub fn net_worth(state: &AppState) -> f64 {
    let accounts = total(
        state
            .accounts
            .iter()
            .map(|a| account_running_balance(a, &state.transactions)),
    );
    let debts = if state.profile.include_debts_in_capital {
        net_debt(&state.debts)
    } else {
        0.0
    };
    accounts + total_savings_value(state) + debts
}

/// Income and expense of settled transactions in `month` (1-12) of `year`
pub fn monthly_totals(transactions: &[Transaction], month: u32, year: i32) -> PeriodTotals {
    period_totals(transactions, &ReportPeriod::Month { year, month })
}

/// Income and expense of settled transactions within a period
pub fn period_totals(transactions: &[Transaction], period: &ReportPeriod) -> PeriodTotals {
    transactions
        .iter()
        .filter(|t| t.is_settled() && period.contains_iso(&t.date))
        .fold(PeriodTotals::default(), |mut totals, t| {
            match t.kind {
                TransactionType::Income => totals.income += t.amount,
                TransactionType::Expense => totals.expense += t.amount,
                TransactionType::Savings => {}
            }
            totals
        })
}

/// Settled transactions of one type grouped by category, largest first.
///
/// Equal amounts keep the order in which their category first appeared.
pub fn category_breakdown(
    transactions: &[Transaction],
    kind: TransactionType,
    period: &ReportPeriod,
) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CategoryTotal> = Vec::new();

    for t in transactions
        .iter()
        .filter(|t| t.is_settled() && t.kind == kind && period.contains_iso(&t.date))
    {
        let slot = *index.entry(t.category_id.as_str()).or_insert_with(|| {
            groups.push(CategoryTotal {
                category_id: t.category_id.clone(),
                amount: 0.0,
                count: 0,
                share: 0.0,
            });
            groups.len() - 1
        });
        groups[slot].amount += t.amount;
        groups[slot].count += 1;
    }

    let sum = total(groups.iter().map(|g| g.amount));
    if sum > 0.0 {
        for g in &mut groups {
            g.share = g.amount / sum * 100.0;
        }
    }

    groups.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    groups
}

/// Dashboard summary as of `today`
pub fn summary(state: &AppState, today: NaiveDate) -> LedgerSummary {
    let accounts = account_balances(state);
    let accounts_total = total(accounts.iter().map(|a| a.balance));
    let month = ReportPeriod::month_of(today);

    LedgerSummary {
        currency: state.profile.currency.clone(),
        accounts,
        accounts_total,
        savings_value: total_savings_value(state),
        debts: debt_totals(&state.debts),
        net_debt: net_debt(&state.debts),
        net_worth: net_worth(state),
        include_debts_in_capital: state.profile.include_debts_in_capital,
        month: month.description(),
        month_totals: period_totals(&state.transactions, &month),
        month_expenses: category_breakdown(&state.transactions, TransactionType::Expense, &month),
        planned_count: state.transactions.iter().filter(|t| t.is_planned).count(),
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SavingsGoal;
    use crate::test_support::{account, debt, tx};

    #[test]
    fn test_running_balance_scenario() {
        let acc = account("acc_1", 1000.0);
        let mut planned = tx("t3", 9999.0, TransactionType::Expense, "acc_1", "2024-01-20");
        planned.is_planned = true;
        let txs = vec![
            tx("t1", 200.0, TransactionType::Income, "acc_1", "2024-01-10"),
            tx("t2", 50.0, TransactionType::Expense, "acc_1", "2024-01-11"),
            planned,
        ];
        assert_eq!(account_running_balance(&acc, &txs), 1150.0);
    }

    #[test]
    fn test_running_balance_ignores_other_accounts_and_subtracts_savings() {
        let acc = account("acc_1", 100.0);
        let txs = vec![
            tx("t1", 30.0, TransactionType::Savings, "acc_1", "2024-01-10"),
            tx("t2", 500.0, TransactionType::Income, "acc_2", "2024-01-10"),
        ];
        assert_eq!(account_running_balance(&acc, &txs), 70.0);
    }

    #[test]
    fn test_net_debt_excludes_banks() {
        let mut bank = debt("d3", 5000.0, DebtType::IOwe);
        bank.is_bank = true;
        let debts = vec![
            debt("d1", 300.0, DebtType::TheyOwe),
            debt("d2", 100.0, DebtType::IOwe),
            bank,
        ];
        assert_eq!(net_debt(&debts), 200.0);
        let totals = debt_totals(&debts);
        assert_eq!(totals.i_owe_bank, 5000.0);
        assert_eq!(totals.they_owe, 300.0);
    }

    #[test]
    fn test_net_worth_is_additive() {
        let mut state = AppState::default();
        state.accounts = vec![account("a1", 1000.0), account("a2", 250.0)];
        state.transactions = vec![
            tx("t1", 100.0, TransactionType::Expense, "a1", "2024-01-01"),
            tx("t2", 40.0, TransactionType::Savings, "a2", "2024-01-02"),
        ];
        state.savings = vec![SavingsGoal {
            id: "g1".to_string(),
            name: "Trip".to_string(),
            target_amount: 1000.0,
            current_amount: 60.0,
            icon: String::new(),
            color: String::new(),
        }];
        state.debts = vec![debt("d1", 300.0, DebtType::TheyOwe), debt("d2", 100.0, DebtType::IOwe)];

        let balances: f64 = state
            .accounts
            .iter()
            .map(|a| account_running_balance(a, &state.transactions))
            .sum();
        let savings = total_savings_value(&state);
        assert_eq!(balances, 1110.0);
        assert_eq!(savings, 100.0);

        state.profile.include_debts_in_capital = false;
        assert_eq!(net_worth(&state), balances + savings);

        state.profile.include_debts_in_capital = true;
        assert_eq!(net_worth(&state), balances + savings + 200.0);

        state.accounts.reverse();
        state.transactions.reverse();
        state.debts.reverse();
        assert_eq!(net_worth(&state), balances + savings + 200.0);
    }

    #[test]
    fn test_planned_savings_count_toward_savings_value() {
        let mut state = AppState::default();
        let mut planned = tx("t1", 100.0, TransactionType::Savings, "acc_cash", "2024-06-01");
        planned.is_planned = true;
        state.transactions = vec![planned];

        assert_eq!(total_savings_value(&state), 100.0);
        // The planned transfer has not left the account yet
        assert_eq!(net_worth(&state), 100.0);
    }

    #[test]
    fn test_empty_state_totals_are_positive_zero() {
        let mut state = AppState::default();
        state.accounts.clear();
        let savings = total_savings_value(&state);
        assert_eq!(savings, 0.0);
        assert!(savings.is_sign_positive());
        assert!(net_worth(&state).is_sign_positive());

        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let json = serde_json::to_value(summary(&state, today)).unwrap();
        assert_eq!(json["savingsValue"].to_string(), "0.0");
    }

    #[test]
    fn test_monthly_totals() {
        let mut planned = tx("t4", 1000.0, TransactionType::Income, "a", "2024-03-20");
        planned.is_planned = true;
        let txs = vec![
            tx("t1", 500.0, TransactionType::Income, "a", "2024-03-01T09:00:00.000Z"),
            tx("t2", 120.0, TransactionType::Expense, "a", "2024-03-31"),
            tx("t3", 80.0, TransactionType::Expense, "a", "2024-04-01"),
            tx("t5", 70.0, TransactionType::Savings, "a", "2024-03-10"),
            planned,
        ];
        let totals = monthly_totals(&txs, 3, 2024);
        assert_eq!(totals.income, 500.0);
        assert_eq!(totals.expense, 120.0);
        assert_eq!(totals.net(), 380.0);
    }

    #[test]
    fn test_category_breakdown_sorted_with_stable_ties() {
        let mut a = tx("t1", 50.0, TransactionType::Expense, "acc", "2024-03-01");
        a.category_id = "food".to_string();
        let mut b = tx("t2", 80.0, TransactionType::Expense, "acc", "2024-03-02");
        b.category_id = "fun".to_string();
        let mut c = tx("t3", 30.0, TransactionType::Expense, "acc", "2024-03-03");
        c.category_id = "food".to_string();
        let mut d = tx("t4", 200.0, TransactionType::Expense, "acc", "2024-03-04");
        d.category_id = "rent".to_string();
        let mut income = tx("t5", 999.0, TransactionType::Income, "acc", "2024-03-05");
        income.category_id = "salary".to_string();

        let rows =
            category_breakdown(&[a, b, c, d, income], TransactionType::Expense, &ReportPeriod::All);
        let order: Vec<&str> = rows.iter().map(|r| r.category_id.as_str()).collect();
        // food and fun tie at 80; food appeared first
        assert_eq!(order, vec!["rent", "food", "fun"]);
        assert_eq!(rows[1].count, 2);
        let share_sum: f64 = rows.iter().map(|r| r.share).sum();
        assert!((share_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_breakdown_respects_period() {
        let mut a = tx("t1", 50.0, TransactionType::Expense, "acc", "2024-02-01");
        a.category_id = "food".to_string();
        let march = ReportPeriod::Month { year: 2024, month: 3 };
        let rows = category_breakdown(&[a], TransactionType::Expense, &march);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_summary() {
        let mut state = AppState::default();
        state.accounts = vec![account("a1", 1000.0)];
        state.transactions = vec![
            tx("t1", 200.0, TransactionType::Income, "a1", "2024-05-02"),
            tx("t2", 50.0, TransactionType::Expense, "a1", "2024-05-03"),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let s = summary(&state, today);
        assert_eq!(s.month, "2024-05");
        assert_eq!(s.accounts_total, 1150.0);
        assert_eq!(s.net_worth, 1150.0);
        assert_eq!(s.month_totals.income, 200.0);
        assert_eq!(s.month_expenses.len(), 1);
        assert_eq!(s.planned_count, 0);
    }

    #[test]
    fn test_engine_does_not_mutate() {
        let mut state = AppState::default();
        state.transactions =
            vec![tx("t1", 200.0, TransactionType::Income, "acc_cash", "2024-05-02")];
        let before = state.clone();
        let _ = net_worth(&state);
        let _ = summary(&state, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(state, before);
    }
}
