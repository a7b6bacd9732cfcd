//! Application state - the single owner of the `people` and `debts` collections.
//!
//! Every mutation goes through a `&mut AppState` and bumps [`AppState::revision`],
//! which lets the query cache tell whether anything changed without comparing whole
//! collections.

use crate::models::{Debt, Person, TrackerData};

/// Label shown for debts whose person no longer exists.
pub const UNKNOWN_PERSON: &str = "Unknown Person";

/// Request from the people view to open a pre-filled debt form.
///
/// Set by [`AppState::request_debt_for`], consumed exactly once by
/// [`AppState::take_pending_intent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDebtIntent {
    /// Person the new debt is for
    pub person_id: String,
    /// `true` when the user owes the person
    pub is_borrowed: bool,
}

/// In-memory people and debts plus the pending debt intent.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    people: Vec<Person>,
    debts: Vec<Debt>,
    pending_intent: Option<PendingDebtIntent>,
    revision: u64,
}

impl AppState {
    /// Builds state from already loaded collections.
    #[must_use]
    pub const fn new(people: Vec<Person>, debts: Vec<Debt>) -> Self {
        Self {
            people,
            debts,
            pending_intent: None,
            revision: 0,
        }
    }

    /// All people, in insertion order.
    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// All debts, in insertion order.
    #[must_use]
    pub fn debts(&self) -> &[Debt] {
        &self.debts
    }

    /// Monotonic counter bumped on every mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Clones both collections into a document.
    #[must_use]
    pub fn snapshot(&self) -> TrackerData {
        TrackerData {
            people: self.people.clone(),
            debts: self.debts.clone(),
        }
    }

    /// Looks a person up by id.
    #[must_use]
    pub fn find_person(&self, id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    /// Looks a person up by exact name, falling back to a case-insensitive match.
    #[must_use]
    pub fn find_person_by_name(&self, name: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.name == name).or_else(|| {
            let lower = name.to_lowercase();
            self.people.iter().find(|p| p.name.to_lowercase() == lower)
        })
    }

    /// Looks a debt up by id.
    #[must_use]
    pub fn find_debt(&self, id: &str) -> Option<&Debt> {
        self.debts.iter().find(|d| d.id == id)
    }

    /// Name of the person with this id, or [`UNKNOWN_PERSON`] when it dangles.
    #[must_use]
    pub fn person_label(&self, id: &str) -> &str {
        self.find_person(id).map_or(UNKNOWN_PERSON, |p| p.name.as_str())
    }

    /// Mutable access to people; counts as a mutation.
    pub fn people_mut(&mut self) -> &mut Vec<Person> {
        self.revision += 1;
        &mut self.people
    }

    /// Mutable access to debts; counts as a mutation.
    pub fn debts_mut(&mut self) -> &mut Vec<Debt> {
        self.revision += 1;
        &mut self.debts
    }

    /// Replaces the people collection wholesale.
    pub fn replace_people(&mut self, people: Vec<Person>) {
        *self.people_mut() = people;
    }

    /// Replaces the debts collection wholesale.
    pub fn replace_debts(&mut self, debts: Vec<Debt>) {
        *self.debts_mut() = debts;
    }

    /// Replaces both collections, e.g. after an import.
    pub fn replace_all(&mut self, data: TrackerData) {
        self.replace_people(data.people);
        self.replace_debts(data.debts);
    }

    /// Records that a new debt should be started for `person_id`.
    pub fn request_debt_for(&mut self, person_id: impl Into<String>, is_borrowed: bool) {
        self.pending_intent = Some(PendingDebtIntent {
            person_id: person_id.into(),
            is_borrowed,
        });
    }

    /// Consumes and clears the pending intent.
    pub fn take_pending_intent(&mut self) -> Option<PendingDebtIntent> {
        self.pending_intent.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_debt, sample_person};
    use crate::models::DebtStatus;

    #[test]
    fn test_mutations_bump_revision() {
        let mut state = AppState::default();
        assert_eq!(state.revision(), 0);

        state.people_mut().push(sample_person("p1", "Alice"));
        state.replace_debts(Vec::new());
        assert_eq!(state.revision(), 2);

        // Reads never bump
        let _ = state.people();
        let _ = state.find_person("p1");
        assert_eq!(state.revision(), 2);
    }

    #[test]
    fn test_person_label_falls_back_for_dangling_reference() {
        let state = AppState::new(vec![sample_person("p1", "Alice")], Vec::new());
        assert_eq!(state.person_label("p1"), "Alice");
        assert_eq!(state.person_label("gone"), UNKNOWN_PERSON);
    }

    #[test]
    fn test_find_person_by_name_is_case_insensitive_fallback() {
        let state = AppState::new(
            vec![sample_person("p1", "Alice"), sample_person("p2", "alice")],
            Vec::new(),
        );
        assert_eq!(state.find_person_by_name("alice").map(|p| p.id.as_str()), Some("p2"));
        assert_eq!(state.find_person_by_name("ALICE").map(|p| p.id.as_str()), Some("p1"));
        assert!(state.find_person_by_name("Bob").is_none());
    }

    #[test]
    fn test_pending_intent_is_consumed_once() {
        let mut state = AppState::default();
        state.request_debt_for("p1", true);
        let intent = state.take_pending_intent();
        assert_eq!(
            intent,
            Some(PendingDebtIntent {
                person_id: "p1".to_string(),
                is_borrowed: true,
            })
        );
        assert!(state.take_pending_intent().is_none());
    }

    #[test]
    fn test_replace_all_swaps_both_collections() {
        let mut state = AppState::new(vec![sample_person("p1", "Alice")], Vec::new());
        let data = TrackerData {
            people: vec![sample_person("p2", "Bob")],
            debts: vec![sample_debt("d1", "p2", 10.0, DebtStatus::Borrowed)],
        };

        state.replace_all(data.clone());
        assert_eq!(state.snapshot(), data);
    }
}
