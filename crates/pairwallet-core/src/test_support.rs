//! Fixtures shared by the unit tests

use chrono::NaiveDate;

use crate::models::{Account, Debt, Subscription, Transaction};
use crate::types::{AccountKind, BillingPeriod, DebtType, TransactionOrigin, TransactionType};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn account(id: &str, balance: f64) -> Account {
    Account {
        id: id.to_string(),
        name: format!("Account {}", id),
        kind: AccountKind::Card,
        balance,
        color: String::new(),
        icon: String::new(),
    }
}

pub fn tx(
    id: &str,
    amount: f64,
    kind: TransactionType,
    account_id: &str,
    date: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
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
        origin: TransactionOrigin::Manual,
    }
}

pub fn debt(id: &str, amount: f64, kind: DebtType) -> Debt {
    Debt {
        id: id.to_string(),
        person_name: format!("Person {}", id),
        amount,
        kind,
        is_bank: false,
        is_monthly: false,
        due_date: None,
        end_date: None,
        date: "2024-01-01".to_string(),
        description: String::new(),
        monthly_payment: None,
        anchor_day: None,
    }
}

pub fn subscription(id: &str, name: &str, period: BillingPeriod, next: NaiveDate) -> Subscription {
    Subscription {
        id: id.to_string(),
        name: name.to_string(),
        amount: 799.0,
        period,
        next_payment_date: next,
        category_id: "cat_fun".to_string(),
        account_id: "acc_cash".to_string(),
        is_active: true,
        reminder_days: 1,
        icon: "📺".to_string(),
        color: "#e50914".to_string(),
        anchor_day: None,
    }
}
