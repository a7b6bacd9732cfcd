//! Debt query engine - filtering, sorting and aggregate statistics.
//!
//! Filtering never mutates the source collection; it keeps the original order and
//! then applies a stable sort. Statistics always cover the full collection, not the
//! filtered view. "Today" is passed in explicitly so results are reproducible.

use crate::{
    models::{Debt, DebtDirection, DebtStatus, Person},
    state::AppState,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Strictly before today, compared at day granularity.
#[must_use]
pub fn is_overdue(due: NaiveDate, today: NaiveDate) -> bool {
    due < today
}

/// Outstanding debt with an expected return date strictly before `today`.
#[must_use]
pub fn is_debt_overdue(debt: &Debt, today: NaiveDate) -> bool {
    debt.status.is_active()
        && debt
            .expected_return_date
            .is_some_and(|due| is_overdue(due, today))
}

/// Filter configuration. Every set criterion must hold (AND); the default keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtFilter {
    /// Only debts with this person
    pub person_id: Option<String>,
    /// Only debts with exactly this status
    pub status: Option<DebtStatus>,
    /// Only debts in this direction
    pub direction: Option<DebtDirection>,
    /// Only overdue debts
    pub overdue: bool,
    /// Inclusive lower bound on the amount
    pub min_amount: Option<f64>,
    /// Inclusive upper bound on the amount
    pub max_amount: Option<f64>,
    /// Inclusive lower bound on the transaction date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the transaction date
    pub date_to: Option<NaiveDate>,
}

impl DebtFilter {
    /// Whether any criterion is set.
    #[must_use]
    pub const fn has_active_filters(&self) -> bool {
        self.person_id.is_some()
            || self.status.is_some()
            || self.direction.is_some()
            || self.overdue
            || self.min_amount.is_some()
            || self.max_amount.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
    }

    /// Whether `debt` passes every set criterion.
    #[must_use]
    pub fn matches(&self, debt: &Debt, today: NaiveDate) -> bool {
        if self.person_id.as_ref().is_some_and(|id| *id != debt.person_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != debt.status) {
            return false;
        }
        if self.direction.is_some_and(|dir| dir != debt.direction()) {
            return false;
        }
        if self.overdue && !is_debt_overdue(debt, today) {
            return false;
        }
        if self.min_amount.is_some_and(|min| debt.amount < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| debt.amount > max) {
            return false;
        }
        if self.date_from.is_some_and(|from| debt.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| debt.date > to) {
            return false;
        }
        true
    }
}

/// Column to sort the debt list by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Transaction date
    #[default]
    Date,
    /// Expected return date; debts without one go last in ascending order
    DueDate,
    /// Amount
    Amount,
    /// Name of the person, resolved through the people collection
    PersonName,
    /// Status; has no comparator, so the order is left as is
    Status,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

/// Sort configuration. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebtSort {
    /// Column
    pub field: SortField,
    /// Direction
    pub direction: SortDirection,
}

impl DebtSort {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Case-insensitive first, then case as a tie-break, so "alice" sorts before "Bob".
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_due_dates(a: &Debt, b: &Debt, direction: SortDirection) -> Ordering {
    match (a.expected_return_date, b.expected_return_date) {
        (None, None) => Ordering::Equal,
        // A missing due date is the logical maximum: last when ascending, first when descending
        (None, Some(_)) => directed(Ordering::Greater, direction),
        (Some(_), None) => directed(Ordering::Less, direction),
        (Some(due_a), Some(due_b)) => directed(due_a.cmp(&due_b), direction),
    }
}

fn person_name<'a>(people: &'a [Person], id: &str) -> &'a str {
    people
        .iter()
        .find(|p| p.id == id)
        .map_or("", |p| p.name.as_str())
}

/// Compares two debts under `sort`. Fields without a comparator return `Equal`.
#[must_use]
pub fn compare_debts(a: &Debt, b: &Debt, people: &[Person], sort: DebtSort) -> Ordering {
    match sort.field {
        SortField::PersonName => directed(
            compare_names(person_name(people, &a.person_id), person_name(people, &b.person_id)),
            sort.direction,
        ),
        SortField::Date => directed(a.date.cmp(&b.date), sort.direction),
        SortField::DueDate => compare_due_dates(a, b, sort.direction),
        SortField::Amount => directed(a.amount.total_cmp(&b.amount), sort.direction),
        SortField::Status => Ordering::Equal,
    }
}

/// Filters `debts` and sorts the survivors. The input slice is left untouched.
#[must_use]
pub fn filter_and_sort<'a>(
    debts: &'a [Debt],
    people: &[Person],
    filter: &DebtFilter,
    sort: DebtSort,
    today: NaiveDate,
) -> Vec<&'a Debt> {
    let mut visible: Vec<&Debt> = debts.iter().filter(|d| filter.matches(d, today)).collect();
    visible.sort_by(|a, b| compare_debts(a, b, people, sort));
    visible
}

/// Count and amount sum for one status.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusTotals {
    /// Number of debts
    pub count: usize,
    /// Sum of their amounts
    pub amount: f64,
}

impl StatusTotals {
    fn add(&mut self, amount: f64) {
        self.count += 1;
        self.amount += amount;
    }
}

/// Aggregates over the whole debt collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtStats {
    /// Status `given`
    pub given: StatusTotals,
    /// Status `payed back`
    pub payed_back: StatusTotals,
    /// Status `borrowed`
    pub borrowed: StatusTotals,
    /// Status `returned`
    pub returned: StatusTotals,
    /// Outstanding debts past their expected return date
    pub overdue_count: usize,
    /// Money others owe the user (`given` sum)
    pub total_outstanding: f64,
    /// Money the user owes others (`borrowed` sum)
    pub total_owed: f64,
    /// `total_outstanding - total_owed`
    pub net_balance: f64,
}

impl DebtStats {
    /// Totals for a single status.
    #[must_use]
    pub const fn for_status(&self, status: DebtStatus) -> StatusTotals {
        match status {
            DebtStatus::Given => self.given,
            DebtStatus::PayedBack => self.payed_back,
            DebtStatus::Borrowed => self.borrowed,
            DebtStatus::Returned => self.returned,
        }
    }
}

/// Computes statistics over every debt.
#[must_use]
pub fn compute_stats(debts: &[Debt], today: NaiveDate) -> DebtStats {
    let mut stats = DebtStats::default();
    for debt in debts {
        match debt.status {
            DebtStatus::Given => stats.given.add(debt.amount),
            DebtStatus::PayedBack => stats.payed_back.add(debt.amount),
            DebtStatus::Borrowed => stats.borrowed.add(debt.amount),
            DebtStatus::Returned => stats.returned.add(debt.amount),
        }
        if is_debt_overdue(debt, today) {
            stats.overdue_count += 1;
        }
    }
    stats.total_outstanding = stats.given.amount;
    stats.total_owed = stats.borrowed.amount;
    stats.net_balance = stats.total_outstanding - stats.total_owed;
    stats
}

/// Result of one query: the visible debts in display order plus global statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtView {
    /// Filtered and sorted debts
    pub debts: Vec<Debt>,
    /// Statistics over the unfiltered collection
    pub stats: DebtStats,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewKey {
    revision: u64,
    filter: DebtFilter,
    sort: DebtSort,
    today: NaiveDate,
}

/// Memoizes the last [`DebtView`].
///
/// The view is recomputed only when the state revision, the filter, the sort or the
/// day changes.
#[derive(Debug, Default)]
pub struct QueryEngine {
    cached: Option<(ViewKey, DebtView)>,
    recomputations: u64,
}

impl QueryEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view for the given configuration, recomputing only when needed.
    pub fn view(
        &mut self,
        state: &AppState,
        filter: &DebtFilter,
        sort: DebtSort,
        today: NaiveDate,
    ) -> &DebtView {
        let key = ViewKey {
            revision: state.revision(),
            filter: filter.clone(),
            sort,
            today,
        };

        match self.cached.take() {
            Some((cached_key, view)) if cached_key == key => &self.cached.insert((cached_key, view)).1,
            _ => {
                let debts = filter_and_sort(state.debts(), state.people(), filter, sort, today)
                    .into_iter()
                    .cloned()
                    .collect();
                let stats = compute_stats(state.debts(), today);
                self.recomputations += 1;
                &self.cached.insert((key, DebtView { debts, stats })).1
            }
        }
    }

    /// How many times a view has been computed, for diagnostics.
    #[must_use]
    pub const fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
