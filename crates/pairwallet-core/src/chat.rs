//! Prompt material for the finance assistant

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use pairwallet_utils::format_amount;

use crate::catalog::category_display;
use crate::ledger;
use crate::models::AppState;
use crate::types::TransactionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Keep the last `max` non-system messages
pub fn trim_history(messages: &[ChatMessage], max: usize) -> Vec<ChatMessage> {
    let conversation: Vec<&ChatMessage> = messages
        .iter()
        .filter(|m| m.role != ChatRole::System)
        .collect();
    let skip = conversation.len().saturating_sub(max);
    conversation.into_iter().skip(skip).cloned().collect()
}

/// Plain-text briefing on the user's finances as of `today`
pub fn system_instruction(state: &AppState, today: NaiveDate) -> String {
    let summary = ledger::summary(state, today);
    let currency = summary.currency.as_str();
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "You are a personal finance assistant for a couple's shared budget. \
         Answer briefly, in the user's language, using only the figures below."
    );
    if !state.profile.name.is_empty() {
        let _ = writeln!(out, "User: {}", state.profile.name);
    }
    let _ = writeln!(out, "Currency: {}", currency);
    let _ = writeln!(out, "Today: {}", today.format("%Y-%m-%d"));

    let _ = writeln!(out, "\nAccounts:");
    for account in &summary.accounts {
        let _ = writeln!(out, "- {}: {}", account.name, format_amount(account.balance, currency));
    }
    let _ = writeln!(out, "Total on accounts: {}", format_amount(summary.accounts_total, currency));

    let _ = writeln!(out, "\nSavings: {}", format_amount(summary.savings_value, currency));
    for goal in &state.savings {
        let _ = writeln!(
            out,
            "- {}: {} of {} ({:.0}%)",
            goal.name,
            format_amount(goal.current_amount, currency),
            format_amount(goal.target_amount, currency),
            goal.progress() * 100.0
        );
    }

    let _ = writeln!(out, "\nDebts:");
    let _ = writeln!(out, "- I owe people: {}", format_amount(summary.debts.i_owe, currency));
    let _ = writeln!(out, "- I owe banks: {}", format_amount(summary.debts.i_owe_bank, currency));
    let _ = writeln!(out, "- Owed to me: {}", format_amount(summary.debts.they_owe, currency));

    let _ = writeln!(out, "\nNet worth: {}", format_amount(summary.net_worth, currency));

    let _ = writeln!(
        out,
        "\nThis month ({}): income {}, expenses {}",
        summary.month,
        format_amount(summary.month_totals.income, currency),
        format_amount(summary.month_totals.expense, currency)
    );
    for row in summary.month_expenses.iter().take(5) {
        let category = category_display(state, &row.category_id);
        let _ = writeln!(out, "- {}: {}", category.name, format_amount(row.amount, currency));
    }

    let upcoming: Vec<_> = state
        .subscriptions
        .iter()
        .filter(|s| s.is_active && s.next_payment_date >= today)
        .collect();
    if !upcoming.is_empty() {
        let _ = writeln!(out, "\nActive subscriptions:");
        for sub in upcoming {
            let _ = writeln!(
                out,
                "- {}: {} on {}",
                sub.name,
                format_amount(sub.amount, currency),
                sub.next_payment_date.format("%Y-%m-%d")
            );
        }
    }

    let planned = state
        .transactions
        .iter()
        .filter(|t| t.is_planned && t.kind != TransactionType::Income)
        .count();
    if planned > 0 {
        let _ = writeln!(out, "\nPlanned payments not yet made: {}", planned);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, debt, tx};
    use crate::types::DebtType;

    #[test]
    fn test_system_instruction_mentions_figures() {
        let mut state = AppState::default();
        state.profile.name = "Аня".to_string();
        state.accounts[0].balance = 1000.0;
        let mut food = tx("t1", 150.0, TransactionType::Expense, "acc_cash", "2024-05-03");
        food.category_id = "cat_food".to_string();
        state.transactions.push(food);
        state.debts.push(debt("d1", 300.0, DebtType::TheyOwe));

        let text = system_instruction(&state, date(2024, 5, 20));
        assert!(text.contains("User: Аня"));
        assert!(text.contains("Currency: RUB"));
        assert!(text.contains("- Наличные: 850 RUB"));
        assert!(text.contains("- Owed to me: 300 RUB"));
        assert!(text.contains("- Продукты: 150 RUB"));
        assert!(text.contains("2024-05"));
    }

    #[test]
    fn test_trim_history_keeps_latest() {
        let messages = vec![
            ChatMessage::system("old prompt"),
            ChatMessage::user("one"),
            ChatMessage::user("two"),
            ChatMessage::user("three"),
        ];
        let kept = trim_history(&messages, 2);
        let texts: Vec<&str> = kept.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
