//! Basic enumerations shared by the domain model

use serde::{Deserialize, Serialize};

/// Account kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Card,
    Cash,
}

impl Default for AccountKind {
    fn default() -> Self {
        AccountKind::Card
    }
}

/// Direction of a transaction, also used as the category type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
    /// Money moved from an account into savings
    Savings,
}

impl TransactionType {
    /// Sign applied to an account balance: income adds, everything else subtracts
    pub fn balance_sign(&self) -> f64 {
        match self {
            TransactionType::Income => 1.0,
            TransactionType::Expense | TransactionType::Savings => -1.0,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" | "expenses" => Ok(TransactionType::Expense),
            "savings" | "saving" => Ok(TransactionType::Savings),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
            TransactionType::Savings => write!(f, "savings"),
        }
    }
}

/// How a transaction changes its linked debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtAction {
    Increase,
    Decrease,
}

impl DebtAction {
    /// Signed change applied to `Debt::amount` for a transaction of `amount`
    pub fn delta(&self, amount: f64) -> f64 {
        match self {
            DebtAction::Increase => amount,
            DebtAction::Decrease => -amount,
        }
    }
}

/// Which side of a debt the user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtType {
    /// The user owes someone
    IOwe,
    /// Someone owes the user
    TheyOwe,
}

impl DebtType {
    /// Planner direction: paying a debt is an expense, receiving is income
    pub fn planned_direction(&self) -> TransactionType {
        match self {
            DebtType::IOwe => TransactionType::Expense,
            DebtType::TheyOwe => TransactionType::Income,
        }
    }

    /// Side of a debt opened by a transaction: paying out means they owe me
    pub fn opened_by(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Income => DebtType::IOwe,
            TransactionType::Expense | TransactionType::Savings => DebtType::TheyOwe,
        }
    }
}

impl std::fmt::Display for DebtType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DebtType::IOwe => write!(f, "i_owe"),
            DebtType::TheyOwe => write!(f, "they_owe"),
        }
    }
}

/// Billing period of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl Default for BillingPeriod {
    fn default() -> Self {
        BillingPeriod::Monthly
    }
}

impl std::str::FromStr for BillingPeriod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" | "week" => Ok(BillingPeriod::Weekly),
            "monthly" | "month" => Ok(BillingPeriod::Monthly),
            "yearly" | "year" => Ok(BillingPeriod::Yearly),
            _ => Err(format!("Invalid billing period: {}", s)),
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingPeriod::Weekly => write!(f, "weekly"),
            BillingPeriod::Monthly => write!(f, "monthly"),
            BillingPeriod::Yearly => write!(f, "yearly"),
        }
    }
}

/// Where a transaction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionOrigin {
    /// Entered by hand
    Manual,
    /// Payment of a subscription (`subscriptionId` is set)
    Subscription,
    /// Opens or settles a debt (`linkedDebtId` is set)
    Debt,
}

impl Default for TransactionOrigin {
    fn default() -> Self {
        TransactionOrigin::Manual
    }
}
