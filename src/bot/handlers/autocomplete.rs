//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come from the invoking user's session. If it cannot be opened there are
//! no suggestions; the command itself reports the problem.

use crate::{
    bot::{BotData, today},
    core::report,
    errors::Error,
    models::{Debt, Person},
    state::AppState,
};
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;

/// Discord autocomplete limit
const MAX_CHOICES: usize = 25;
/// Discord limit on the length of a choice label
const MAX_LABEL_CHARS: usize = 100;

/// Person names containing `partial` (case-insensitive), sorted.
#[must_use]
pub fn matching_person_names(people: &[Person], partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = people
        .iter()
        .filter(|person| person.name.to_lowercase().contains(&partial_lower))
        .map(|person| person.name.clone())
        .take(MAX_CHOICES)
        .collect();

    matching.sort();
    matching
}

/// Debts whose description line contains `partial`, newest first, as `(label, id)`.
#[must_use]
pub fn matching_debts(
    state: &AppState,
    partial: &str,
    currency: &str,
    today: NaiveDate,
) -> Vec<(String, String)> {
    let partial_lower = partial.to_lowercase();
    let mut debts: Vec<&Debt> = state.debts().iter().collect();
    debts.sort_by(|a, b| b.date.cmp(&a.date));

    debts
        .into_iter()
        .map(|debt| {
            let line = report::format_debt_line(state, debt, currency, today);
            (report::truncate_chars(&line, MAX_LABEL_CHARS), debt.id.clone())
        })
        .filter(|(label, _)| label.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect()
}

/// Provides autocomplete suggestions for person names.
pub async fn autocomplete_person_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let profile = ctx.author().id.to_string();
    let Ok(session) = ctx.data().sessions.open(&profile).await else {
        return Vec::new();
    };

    let session = session.lock().await;
    matching_person_names(session.state().people(), partial)
}

/// Provides autocomplete suggestions for debts. The user sees a description line;
/// the command receives the debt id.
pub async fn autocomplete_debt(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let profile = ctx.author().id.to_string();
    let Ok(session) = ctx.data().sessions.open(&profile).await else {
        return Vec::new();
    };

    let session = session.lock().await;
    matching_debts(session.state(), partial, ctx.data().currency(), today())
        .into_iter()
        .map(|(label, id)| serenity::AutocompleteChoice::new(label, id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::DebtStatus,
        test_utils::{date, sample_debt, sample_person},
    };

    #[test]
    fn test_person_names_filtered_and_sorted() {
        let people = vec![
            sample_person("p1", "Mykola"),
            sample_person("p2", "alina"),
            sample_person("p3", "Bob"),
        ];
        assert_eq!(matching_person_names(&people, "LI"), vec!["alina"]);
        assert_eq!(
            matching_person_names(&people, ""),
            vec!["Bob", "Mykola", "alina"]
        );
    }

    #[test]
    fn test_debt_choices_newest_first() {
        let mut older = sample_debt("d1", "p1", 10.0, DebtStatus::Given);
        older.date = date(2024, 1, 1);
        let mut newer = sample_debt("d2", "p2", 20.0, DebtStatus::Borrowed);
        newer.date = date(2024, 2, 1);
        let state = AppState::new(
            vec![sample_person("p1", "Alice"), sample_person("p2", "Bob")],
            vec![older, newer],
        );

        let all = matching_debts(&state, "", "UAH", date(2024, 3, 1));
        let ids: Vec<&str> = all.iter().map(|(_, id)| id.as_str()).collect();
        assert_eq!(ids, vec!["d2", "d1"]);
        assert!(all[0].0.starts_with("Bob · UAH 20.00"));

        let alice = matching_debts(&state, "alice", "UAH", date(2024, 3, 1));
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].1, "d1");
    }
}
