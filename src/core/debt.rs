//! Debt business logic - Handles creating, editing, settling and removing debts.
//!
//! A [`DebtDraft`] carries the user-entered fields. Its direction is authoritative:
//! if the requested status belongs to the other direction it is replaced by the
//! direction's active status, so a debt never silently flips between "they owe"
//! and "you owe".

use crate::{
    errors::{Error, Result},
    models::{Debt, DebtDirection, DebtStatus},
    state::{AppState, PendingDebtIntent},
};
use chrono::NaiveDate;

/// Field values for a new or edited debt.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtDraft {
    /// Person the debt is with
    pub person_id: String,
    /// Amount of money
    pub amount: f64,
    /// Free-form note
    pub description: String,
    /// Day the money changed hands
    pub date: NaiveDate,
    /// Day the money is expected back
    pub expected_return_date: Option<NaiveDate>,
    /// Which way the money went
    pub direction: DebtDirection,
    /// Explicit status; defaults to the direction's active status
    pub status: Option<DebtStatus>,
}

impl DebtDraft {
    /// Empty draft for `person_id` dated `today`.
    #[must_use]
    pub fn for_person(person_id: impl Into<String>, is_borrowed: bool, today: NaiveDate) -> Self {
        Self {
            person_id: person_id.into(),
            amount: 0.0,
            description: String::new(),
            date: today,
            expected_return_date: None,
            direction: DebtDirection::from_borrowed(is_borrowed),
            status: None,
        }
    }

    /// Draft pre-filled from a pending intent raised by the people view.
    #[must_use]
    pub fn from_intent(intent: PendingDebtIntent, today: NaiveDate) -> Self {
        Self::for_person(intent.person_id, intent.is_borrowed, today)
    }

    /// Draft holding the current values of an existing debt, for editing.
    #[must_use]
    pub fn from_debt(debt: &Debt) -> Self {
        Self {
            person_id: debt.person_id.clone(),
            amount: debt.amount,
            description: debt.description.clone(),
            date: debt.date,
            expected_return_date: debt.expected_return_date,
            direction: debt.direction(),
            status: Some(debt.status),
        }
    }

    /// Status the debt will be stored with.
    #[must_use]
    pub fn resolved_status(&self) -> DebtStatus {
        match self.status {
            Some(status) if status.direction() == self.direction => status,
            _ => self.direction.active_status(),
        }
    }

    fn validate(&self, state: &AppState) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.amount,
            });
        }
        if state.find_person(&self.person_id).is_none() {
            return Err(Error::PersonNotFound {
                id: self.person_id.clone(),
            });
        }
        Ok(())
    }

    fn into_debt(self, id: String) -> Debt {
        let status = self.resolved_status();
        Debt {
            id,
            person_id: self.person_id,
            amount: self.amount,
            description: self.description,
            date: self.date,
            expected_return_date: self.expected_return_date,
            status,
        }
    }
}

/// Creates a debt with a fresh id and appends it to the collection.
///
/// Any pending debt intent is cleared: the form it asked for has been filled in or
/// replaced by this debt.
pub fn add_debt(state: &mut AppState, draft: DebtDraft) -> Result<Debt> {
    draft.validate(state)?;
    let debt = draft.into_debt(uuid::Uuid::new_v4().to_string());
    state.take_pending_intent();
    state.debts_mut().push(debt.clone());
    tracing::debug!("Added debt {} ({} {})", debt.id, debt.amount, debt.status);
    Ok(debt)
}

/// Replaces every field of debt `id` except the id itself.
///
/// An absent expected return date in the draft removes the existing one.
pub fn update_debt(state: &mut AppState, id: &str, draft: DebtDraft) -> Result<Debt> {
    if state.find_debt(id).is_none() {
        return Err(Error::DebtNotFound { id: id.to_string() });
    }
    draft.validate(state)?;

    let updated = draft.into_debt(id.to_string());
    let slot = state
        .debts_mut()
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(|| Error::DebtNotFound { id: id.to_string() })?;
    *slot = updated.clone();
    Ok(updated)
}

/// Removes debt `id`.
pub fn remove_debt(state: &mut AppState, id: &str) -> Result<Debt> {
    let debt = state
        .find_debt(id)
        .cloned()
        .ok_or_else(|| Error::DebtNotFound { id: id.to_string() })?;
    state.debts_mut().retain(|d| d.id != id);
    Ok(debt)
}

/// Flips debt `id` between outstanding and settled, keeping its direction.
pub fn toggle_debt_status(state: &mut AppState, id: &str) -> Result<Debt> {
    let debt = state
        .debts_mut()
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(|| Error::DebtNotFound { id: id.to_string() })?;
    debt.status = debt.status.toggled();
    Ok(debt.clone())
}

/// Removes every settled debt and returns how many were removed.
pub fn remove_settled_debts(state: &mut AppState) -> usize {
    let settled = state
        .debts()
        .iter()
        .filter(|d| d.status.is_settled())
        .count();
    if settled > 0 {
        state.debts_mut().retain(|d| d.status.is_active());
    }
    settled
}
