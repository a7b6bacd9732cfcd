//! Display formatting for debts, people and statistics.
//!
//! These helpers return plain strings so that any front end can use them; the bot
//! layer wraps them in embeds.

use crate::{
    core::{person::PersonSummary, query::DebtStats},
    models::{Debt, DebtDirection, DebtStatus},
    state::AppState,
};
use chrono::NaiveDate;

/// Formats an amount as `<CUR> 1,234.50`; negative amounts get a leading minus.
#[must_use]
pub fn format_currency(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}{currency} {grouped}.{cents}")
}

/// `Mar 5, 2024`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Human-readable status.
#[must_use]
pub const fn status_label(status: DebtStatus) -> &'static str {
    match status {
        DebtStatus::Given => "Given",
        DebtStatus::PayedBack => "Paid back",
        DebtStatus::Borrowed => "Borrowed",
        DebtStatus::Returned => "Returned",
    }
}

/// Human-readable direction.
#[must_use]
pub const fn direction_label(direction: DebtDirection) -> &'static str {
    match direction {
        DebtDirection::TheyOwe => "They owe you",
        DebtDirection::YouOwe => "You owe them",
    }
}

/// One line describing a debt, e.g.
/// `Alice · UAH 50.00 · Given · Mar 5, 2024 · due Apr 1, 2024 (overdue) · Lunch`.
#[must_use]
pub fn format_debt_line(state: &AppState, debt: &Debt, currency: &str, today: NaiveDate) -> String {
    let mut parts = vec![
        state.person_label(&debt.person_id).to_string(),
        format_currency(debt.amount, currency),
        status_label(debt.status).to_string(),
        format_date(debt.date),
    ];

    if let Some(due) = debt.expected_return_date {
        let overdue = if crate::core::query::is_debt_overdue(debt, today) {
            " (overdue)"
        } else {
            ""
        };
        parts.push(format!("due {}{overdue}", format_date(due)));
    }
    if !debt.description.is_empty() {
        parts.push(debt.description.clone());
    }

    parts.join(" · ")
}

/// Multi-line overview of the global statistics.
#[must_use]
pub fn format_stats(stats: &DebtStats, currency: &str) -> String {
    format!(
        "They owe you: {} ({} open, {} paid back)\n\
         You owe: {} ({} open, {} returned)\n\
         Net balance: {}\n\
         Overdue: {}",
        format_currency(stats.total_outstanding, currency),
        stats.given.count,
        stats.payed_back.count,
        format_currency(stats.total_owed, currency),
        stats.borrowed.count,
        stats.returned.count,
        format_currency(stats.net_balance, currency),
        stats.overdue_count,
    )
}

/// Cuts `text` to at most `max_chars` characters, ending in `…` when shortened.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Joins leading `lines` with newlines while the result stays within `max_chars`.
///
/// Returns the joined text and how many lines it holds.
#[must_use]
pub fn join_lines_within(lines: &[String], max_chars: usize) -> (String, usize) {
    let mut text = String::new();
    let mut used = 0;
    let mut count = 0;
    for line in lines {
        let separator = usize::from(count > 0);
        let length = line.chars().count() + separator;
        if used + length > max_chars {
            break;
        }
        if separator > 0 {
            text.push('\n');
        }
        text.push_str(line);
        used += length;
        count += 1;
    }
    (text, count)
}

/// Short summary of one person's debts.
#[must_use]
pub fn format_person_summary(summary: &PersonSummary, currency: &str) -> String {
    if !summary.has_debts() {
        return "No transactions yet".to_string();
    }
    format!(
        "Owes you {} · You owe {} · Net {} ({} transaction(s))",
        format_currency(summary.total_outstanding, currency),
        format_currency(summary.total_borrowed, currency),
        format_currency(summary.net_balance(), currency),
        summary.total_debts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::query::compute_stats,
        test_utils::{date, sample_debt, sample_person},
    };

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, "UAH"), "UAH 0.00");
        assert_eq!(format_currency(50.0, "UAH"), "UAH 50.00");
        assert_eq!(format_currency(1234.5, "UAH"), "UAH 1,234.50");
        assert_eq!(format_currency(1_234_567.891, "USD"), "USD 1,234,567.89");
        assert_eq!(format_currency(-100.0, "UAH"), "-UAH 100.00");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(2024, 3, 5)), "Mar 5, 2024");
    }

    #[test]
    fn test_format_debt_line_marks_overdue_and_unknown_person() {
        let state = AppState::new(vec![sample_person("p1", "Alice")], Vec::new());

        let mut debt = sample_debt("d1", "p1", 50.0, DebtStatus::Given);
        debt.description = "Lunch".to_string();
        debt.expected_return_date = Some(date(2024, 2, 1));
        assert_eq!(
            format_debt_line(&state, &debt, "UAH", date(2024, 3, 1)),
            "Alice · UAH 50.00 · Given · Jan 15, 2024 · due Feb 1, 2024 (overdue) · Lunch"
        );

        let orphan = sample_debt("d2", "gone", 5.0, DebtStatus::Returned);
        assert_eq!(
            format_debt_line(&state, &orphan, "UAH", date(2024, 3, 1)),
            "Unknown Person · UAH 5.00 · Returned · Jan 15, 2024"
        );
    }

    #[test]
    fn test_format_stats() {
        let debts = vec![
            sample_debt("d1", "p1", 100.0, DebtStatus::Given),
            sample_debt("d2", "p1", 30.0, DebtStatus::Borrowed),
        ];
        let text = format_stats(&compute_stats(&debts, date(2024, 1, 1)), "UAH");
        assert!(text.contains("They owe you: UAH 100.00 (1 open, 0 paid back)"));
        assert!(text.contains("Net balance: UAH 70.00"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Lunch", 10), "Lunch");
        assert_eq!(truncate_chars("Borscht and varenyky", 8), "Borscht…");
        // Counts characters, not bytes
        assert_eq!(truncate_chars("ґудзик", 6), "ґудзик");
        assert_eq!(truncate_chars(&"x".repeat(5000), 300).chars().count(), 300);
    }

    #[test]
    fn test_join_lines_within_stops_before_limit() {
        let lines = vec!["a".repeat(40), "b".repeat(40), "c".repeat(40)];
        let (text, shown) = join_lines_within(&lines, 81);
        assert_eq!(shown, 2);
        assert_eq!(text.chars().count(), 81);

        let (text, shown) = join_lines_within(&lines, 1000);
        assert_eq!(shown, 3);
        assert_eq!(text.lines().count(), 3);

        let (text, shown) = join_lines_within(&["x".repeat(5000)], 4096);
        assert_eq!((text.as_str(), shown), ("", 0));
    }

    #[test]
    fn test_format_person_summary_without_debts() {
        assert_eq!(
            format_person_summary(&PersonSummary::default(), "UAH"),
            "No transactions yet"
        );
    }
}
