//! Domain model: the entities stored in a user's state document
//!
//! Field names follow the camelCase JSON document the Mini App persists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::{iso_date, iso_date_opt, parse_iso_date};
use crate::types::{
    AccountKind, BillingPeriod, DebtAction, DebtType, TransactionOrigin, TransactionType,
};

/// Document schema version written by this crate
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Money account (card or cash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AccountKind,
    /// Manually set baseline; the running balance adds transactions on top
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

/// Transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// A single ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Always positive; direction comes from `kind`
    pub amount: f64,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub account_id: String,
    /// ISO date or datetime
    pub date: String,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub is_planned: bool,
    #[serde(default)]
    pub is_joint: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_debt_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_action: Option<DebtAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub origin: TransactionOrigin,
}

impl Transaction {
    /// Calendar date of the transaction
    pub fn date_naive(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.date)
    }

    /// Amount with the sign it has on the account balance
    pub fn signed_amount(&self) -> f64 {
        self.kind.balance_sign() * self.amount
    }

    /// Counted in balances and period summaries
    pub fn is_settled(&self) -> bool {
        !self.is_planned
    }

    /// Debt link and action, when both are present
    pub fn debt_link(&self) -> Option<(&str, DebtAction)> {
        match (self.linked_debt_id.as_deref(), self.debt_action) {
            (Some(id), Some(action)) if !id.is_empty() => Some((id, action)),
            _ => None,
        }
    }
}

/// Money owed to or by someone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub person_name: String,
    /// Running remainder, never negative
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: DebtType,
    #[serde(default)]
    pub is_bank: bool,
    #[serde(default)]
    pub is_monthly: bool,
    #[serde(default, with = "iso_date_opt", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, with = "iso_date_opt", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Creation date (ISO)
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    /// Installment shown in the planner for monthly debts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_day: Option<u32>,
}

impl Debt {
    /// Apply a signed change, clamping the remainder at zero
    pub fn adjust(&mut self, delta: f64) {
        self.amount = (self.amount + delta).max(0.0);
    }

    /// Installment due on the next due date
    pub fn installment(&self) -> f64 {
        match self.monthly_payment {
            Some(payment) if self.is_monthly && payment > 0.0 => payment.min(self.amount),
            _ => self.amount,
        }
    }
}

/// Savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

impl SavingsGoal {
    /// Share of the target reached, 0.0..=1.0
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        (self.current_amount / self.target_amount).clamp(0.0, 1.0)
    }
}

/// Recurring payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub period: BillingPeriod,
    #[serde(with = "iso_date")]
    pub next_payment_date: NaiveDate,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub reminder_days: u32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_day: Option<u32>,
}

fn default_true() -> bool {
    true
}

/// Per-user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_partner_id: Option<String>,
    #[serde(default)]
    pub include_debts_in_capital: bool,
    /// Opaque layout blob owned by the presentation layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_layout: Option<serde_json::Value>,
}

fn default_currency() -> String {
    "RUB".to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            currency: default_currency(),
            avatar: None,
            partner_id: None,
            pending_partner_id: None,
            include_debts_in_capital: false,
            dashboard_layout: None,
        }
    }
}

/// The whole persisted document for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Missing in legacy documents, which read as version 0
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub savings: Vec<SavingsGoal>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub profile: Profile,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            transactions: Vec::new(),
            categories: default_categories(),
            accounts: vec![Account {
                id: "acc_cash".to_string(),
                name: "Наличные".to_string(),
                kind: AccountKind::Cash,
                balance: 0.0,
                color: "#22c55e".to_string(),
                icon: "💵".to_string(),
            }],
            debts: Vec::new(),
            savings: Vec::new(),
            subscriptions: Vec::new(),
            profile: Profile::default(),
        }
    }
}

fn default_categories() -> Vec<Category> {
    let seed = [
        ("cat_food", "Продукты", "🛒", "#f97316", TransactionType::Expense),
        ("cat_transport", "Транспорт", "🚌", "#3b82f6", TransactionType::Expense),
        ("cat_home", "Дом", "🏠", "#a855f7", TransactionType::Expense),
        ("cat_fun", "Развлечения", "🎬", "#ec4899", TransactionType::Expense),
        ("cat_salary", "Зарплата", "💼", "#22c55e", TransactionType::Income),
        ("cat_gift", "Подарки", "🎁", "#eab308", TransactionType::Income),
        ("cat_savings", "Накопления", "🏦", "#14b8a6", TransactionType::Savings),
    ];
    seed.iter()
        .map(|(id, name, icon, color, kind)| Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            kind: *kind,
        })
        .collect()
}

impl AppState {
    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn debt(&self, id: &str) -> Option<&Debt> {
        self.debts.iter().find(|d| d.id == id)
    }

    pub fn debt_mut(&mut self, id: &str) -> Option<&mut Debt> {
        self.debts.iter_mut().find(|d| d.id == id)
    }

    pub fn subscription(&self, id: &str) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.id == id)
    }

    pub fn subscription_mut(&mut self, id: &str) -> Option<&mut Subscription> {
        self.subscriptions.iter_mut().find(|s| s.id == id)
    }

    pub fn goal_mut(&mut self, id: &str) -> Option<&mut SavingsGoal> {
        self.savings.iter_mut().find(|g| g.id == id)
    }

    /// Account used when an operation does not name one
    pub fn default_account_id(&self) -> Option<&str> {
        self.accounts.first().map(|a| a.id.as_str())
    }
}
