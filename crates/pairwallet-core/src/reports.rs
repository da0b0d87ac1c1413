//! Report structures for API responses

use serde::{Deserialize, Serialize};

/// Income and expense of settled transactions over a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub income: f64,
    pub expense: f64,
}

impl PeriodTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// One category's share of a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: String,
    pub amount: f64,
    pub count: usize,
    /// Percentage of the breakdown total
    pub share: f64,
}

/// Running balance of one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub account_id: String,
    pub name: String,
    pub balance: f64,
}

/// Outstanding debt by side
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtTotals {
    /// Owed to people
    pub i_owe: f64,
    /// Owed to banks, kept out of net debt
    pub i_owe_bank: f64,
    pub they_owe: f64,
}

/// Dashboard figures derived from one state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub currency: String,
    pub accounts: Vec<AccountBalance>,
    pub accounts_total: f64,
    pub savings_value: f64,
    pub debts: DebtTotals,
    pub net_debt: f64,
    pub net_worth: f64,
    pub include_debts_in_capital: bool,
    /// Calendar month the totals cover, `YYYY-MM`
    pub month: String,
    pub month_totals: PeriodTotals,
    pub month_expenses: Vec<CategoryTotal>,
    pub planned_count: usize,
}
