//! Person business logic - Handles adding, renaming and removing people.
//!
//! Removing a person who still has debts is a two-step operation: [`remove_person`]
//! refuses with [`Error::PersonHasDebts`], and [`confirm_remove_person`] removes the
//! person together with every debt that references them.

use crate::{
    errors::{Error, Result},
    models::{Debt, DebtStatus, Person},
    state::AppState,
};

/// Per-person totals shown on the people view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonSummary {
    /// Number of debts referencing the person
    pub total_debts: usize,
    /// Debts with status `given`
    pub outstanding_count: usize,
    /// Debts with status `payed back`
    pub paid_count: usize,
    /// Debts with status `borrowed`
    pub borrowed_count: usize,
    /// Debts with status `returned`
    pub returned_count: usize,
    /// Sum of `given` amounts
    pub total_outstanding: f64,
    /// Sum of `payed back` amounts
    pub total_paid: f64,
    /// Sum of `borrowed` amounts
    pub total_borrowed: f64,
    /// Sum of `returned` amounts
    pub total_returned: f64,
}

impl PersonSummary {
    /// What the person owes the user minus what the user owes them.
    #[must_use]
    pub fn net_balance(&self) -> f64 {
        self.total_outstanding - self.total_borrowed
    }

    /// Whether any debt references the person.
    #[must_use]
    pub const fn has_debts(&self) -> bool {
        self.total_debts > 0
    }
}

fn normalized_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidName);
    }
    Ok(trimmed.to_string())
}

/// Adds a person with a fresh id. The name is trimmed and must not be empty.
pub fn add_person(state: &mut AppState, name: &str) -> Result<Person> {
    let person = Person::new(normalized_name(name)?);
    state.people_mut().push(person.clone());
    tracing::debug!("Added person {} ({})", person.name, person.id);
    Ok(person)
}

/// Renames a person in place.
pub fn rename_person(state: &mut AppState, id: &str, new_name: &str) -> Result<Person> {
    let name = normalized_name(new_name)?;
    if state.find_person(id).is_none() {
        return Err(Error::PersonNotFound { id: id.to_string() });
    }

    let person = state
        .people_mut()
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| Error::PersonNotFound { id: id.to_string() })?;
    person.name = name;
    Ok(person.clone())
}

/// Removes a person who has no debts.
///
/// Returns [`Error::PersonHasDebts`] without touching anything when debts still
/// reference the person; call [`confirm_remove_person`] to go ahead.
pub fn remove_person(state: &mut AppState, id: &str) -> Result<Person> {
    let person = state
        .find_person(id)
        .cloned()
        .ok_or_else(|| Error::PersonNotFound { id: id.to_string() })?;

    let count = state.debts().iter().filter(|d| d.person_id == id).count();
    if count > 0 {
        return Err(Error::PersonHasDebts {
            name: person.name,
            count,
        });
    }

    state.people_mut().retain(|p| p.id != id);
    Ok(person)
}

/// Removes a person and every debt that references them.
///
/// Returns the removed person and the number of debts removed with them.
pub fn confirm_remove_person(state: &mut AppState, id: &str) -> Result<(Person, usize)> {
    let person = state
        .find_person(id)
        .cloned()
        .ok_or_else(|| Error::PersonNotFound { id: id.to_string() })?;

    state.people_mut().retain(|p| p.id != id);

    let before = state.debts().len();
    if state.debts().iter().any(|d| d.person_id == id) {
        state.debts_mut().retain(|d| d.person_id != id);
    }
    let removed = before - state.debts().len();

    tracing::info!("Removed person {} with {removed} debt(s)", person.name);
    Ok((person, removed))
}

/// Totals for one person, computed from `debts`.
#[must_use]
pub fn summarize_person(debts: &[Debt], person_id: &str) -> PersonSummary {
    debts
        .iter()
        .filter(|d| d.person_id == person_id)
        .fold(PersonSummary::default(), |mut summary, debt| {
            summary.total_debts += 1;
            match debt.status {
                DebtStatus::Given => {
                    summary.outstanding_count += 1;
                    summary.total_outstanding += debt.amount;
                }
                DebtStatus::PayedBack => {
                    summary.paid_count += 1;
                    summary.total_paid += debt.amount;
                }
                DebtStatus::Borrowed => {
                    summary.borrowed_count += 1;
                    summary.total_borrowed += debt.amount;
                }
                DebtStatus::Returned => {
                    summary.returned_count += 1;
                    summary.total_returned += debt.amount;
                }
            }
            summary
        })
}

/// Every person paired with their summary, in the people collection's order.
#[must_use]
pub fn summarize_people(state: &AppState) -> Vec<(&Person, PersonSummary)> {
    state
        .people()
        .iter()
        .map(|person| (person, summarize_person(state.debts(), &person.id)))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{sample_debt, sample_person};

    fn state_with_debts() -> AppState {
        AppState::new(
            vec![sample_person("p1", "Alice"), sample_person("p2", "Bob")],
            vec![
                sample_debt("d1", "p1", 100.0, DebtStatus::Given),
                sample_debt("d2", "p1", 40.0, DebtStatus::PayedBack),
                sample_debt("d3", "p1", 30.0, DebtStatus::Borrowed),
                sample_debt("d4", "p2", 5.0, DebtStatus::Returned),
            ],
        )
    }

    #[test]
    fn test_add_person_trims_name() -> Result<()> {
        let mut state = AppState::default();
        let person = add_person(&mut state, "  Carol  ")?;
        assert_eq!(person.name, "Carol");
        assert_eq!(state.people().len(), 1);
        Ok(())
    }

    #[test]
    fn test_add_person_rejects_blank_name() {
        let mut state = AppState::default();
        assert!(matches!(add_person(&mut state, "   "), Err(Error::InvalidName)));
        assert!(state.people().is_empty());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_rename_person() -> Result<()> {
        let mut state = state_with_debts();
        let renamed = rename_person(&mut state, "p2", " Robert ")?;
        assert_eq!(renamed.name, "Robert");
        assert_eq!(state.person_label("p2"), "Robert");

        assert!(matches!(
            rename_person(&mut state, "nobody", "X"),
            Err(Error::PersonNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_remove_person_without_debts() -> Result<()> {
        let mut state = state_with_debts();
        let carol = add_person(&mut state, "Carol")?;
        let removed = remove_person(&mut state, &carol.id)?;
        assert_eq!(removed.name, "Carol");
        assert_eq!(state.people().len(), 2);
        Ok(())
    }

    #[test]
    fn test_remove_person_with_debts_needs_confirmation() {
        let mut state = state_with_debts();
        let revision = state.revision();

        let result = remove_person(&mut state, "p1");
        assert!(matches!(
            result,
            Err(Error::PersonHasDebts { count: 3, .. })
        ));
        assert_eq!(state.people().len(), 2);
        assert_eq!(state.revision(), revision);
    }

    #[test]
    fn test_confirm_remove_person_cascades() -> Result<()> {
        let mut state = state_with_debts();
        let (person, removed) = confirm_remove_person(&mut state, "p1")?;
        assert_eq!(person.name, "Alice");
        assert_eq!(removed, 3);
        assert_eq!(state.people().len(), 1);
        assert_eq!(state.debts().len(), 1);
        assert_eq!(state.debts()[0].id, "d4");
        Ok(())
    }

    #[test]
    fn test_summarize_person() {
        let state = state_with_debts();
        let summary = summarize_person(state.debts(), "p1");

        assert_eq!(summary.total_debts, 3);
        assert_eq!(summary.outstanding_count, 1);
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.borrowed_count, 1);
        assert_eq!(summary.returned_count, 0);
        assert_eq!(summary.total_outstanding, 100.0);
        assert_eq!(summary.total_paid, 40.0);
        assert_eq!(summary.net_balance(), 70.0);
        assert!(summary.has_debts());
    }

    #[test]
    fn test_summarize_people_keeps_order() {
        let state = state_with_debts();
        let summaries = summarize_people(&state);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].0.name, "Alice");
        assert_eq!(summaries[1].1.total_returned, 5.0);
        assert_eq!(summaries[1].1.net_balance(), 0.0);
    }
}
