//! Domain records: people, debts and the two-collection document.
//!
//! These types are the on-disk and on-the-wire shape of the tracker. Field names are
//! serialized in camelCase so that files exported by earlier versions of the app
//! import unchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Someone the user lends money to or borrows money from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Random unique identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl Person {
    /// Creates a person with a fresh random id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

/// Which way the money went.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebtDirection {
    /// The user lent money: they owe you
    #[serde(rename = "they-owe")]
    TheyOwe,
    /// The user borrowed money: you owe them
    #[serde(rename = "you-owe")]
    YouOwe,
}

impl DebtDirection {
    /// Picks the direction from the "is borrowed" flag used by the people view.
    #[must_use]
    pub const fn from_borrowed(is_borrowed: bool) -> Self {
        if is_borrowed { Self::YouOwe } else { Self::TheyOwe }
    }

    /// Status of an outstanding debt in this direction.
    #[must_use]
    pub const fn active_status(self) -> DebtStatus {
        match self {
            Self::TheyOwe => DebtStatus::Given,
            Self::YouOwe => DebtStatus::Borrowed,
        }
    }
}

/// Lifecycle status of a debt.
///
/// The four values sit on two axes: direction (`Given`/`PayedBack` are money owed to
/// the user, `Borrowed`/`Returned` money the user owes) and settlement (`Given` and
/// `Borrowed` are outstanding, the other two are closed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebtStatus {
    /// Lent out, not yet paid back
    #[serde(rename = "given")]
    Given,
    /// Lent out and paid back
    #[serde(rename = "payed back", alias = "payed_back")]
    PayedBack,
    /// Borrowed, not yet returned
    #[serde(rename = "borrowed")]
    Borrowed,
    /// Borrowed and returned
    #[serde(rename = "returned")]
    Returned,
}

impl DebtStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 4] = [Self::Given, Self::PayedBack, Self::Borrowed, Self::Returned];

    /// Direction axis of this status.
    #[must_use]
    pub const fn direction(self) -> DebtDirection {
        match self {
            Self::Given | Self::PayedBack => DebtDirection::TheyOwe,
            Self::Borrowed | Self::Returned => DebtDirection::YouOwe,
        }
    }

    /// Outstanding (not yet settled).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Given | Self::Borrowed)
    }

    /// Settled (closed).
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !self.is_active()
    }

    /// Flips settlement without ever changing direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Given => Self::PayedBack,
            Self::PayedBack => Self::Given,
            Self::Borrowed => Self::Returned,
            Self::Returned => Self::Borrowed,
        }
    }

    /// Wire name, as written to exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "given",
            Self::PayedBack => "payed back",
            Self::Borrowed => "borrowed",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single amount of money lent or borrowed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    /// Random unique identifier
    pub id: String,
    /// Id of the [`Person`] on the other side; may dangle
    pub person_id: String,
    /// Amount of money, never negative when created through the app
    pub amount: f64,
    /// Free-form note
    #[serde(default)]
    pub description: String,
    /// Day the money changed hands
    pub date: NaiveDate,
    /// Day the money is expected back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_return_date: Option<NaiveDate>,
    /// Current status
    pub status: DebtStatus,
}

impl Debt {
    /// Direction of this debt, derived from its status.
    #[must_use]
    pub const fn direction(&self) -> DebtDirection {
        self.status.direction()
    }
}

/// Both collections together: the shape of an export file and of the remote document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerData {
    /// All people
    pub people: Vec<Person>,
    /// All debts
    pub debts: Vec<Debt>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_toggle_stays_within_direction() {
        for status in DebtStatus::ALL {
            assert_eq!(status.toggled().direction(), status.direction());
            assert_ne!(status.toggled().is_active(), status.is_active());
            assert_eq!(status.toggled().toggled(), status);
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&DebtStatus::PayedBack).unwrap(),
            "\"payed back\""
        );
        let legacy: DebtStatus = serde_json::from_str("\"payed_back\"").unwrap();
        assert_eq!(legacy, DebtStatus::PayedBack);
        assert_eq!(DebtStatus::Returned.to_string(), "returned");
        assert!(serde_json::from_str::<DebtStatus>("\"lost\"").is_err());
    }

    #[test]
    fn test_debt_serializes_camel_case_and_omits_missing_due_date() {
        let debt = Debt {
            id: "d1".to_string(),
            person_id: "p1".to_string(),
            amount: 50.0,
            description: "Lunch".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            expected_return_date: None,
            status: DebtStatus::Given,
        };

        let json = serde_json::to_value(&debt).unwrap();
        assert_eq!(json["personId"], "p1");
        assert_eq!(json["date"], "2024-03-01");
        assert!(json.get("expectedReturnDate").is_none());
    }

    #[test]
    fn test_direction_statuses() {
        assert_eq!(DebtDirection::from_borrowed(true), DebtDirection::YouOwe);
        assert_eq!(DebtDirection::TheyOwe.active_status(), DebtStatus::Given);
        assert_eq!(DebtDirection::YouOwe.active_status(), DebtStatus::Borrowed);
        assert_eq!(DebtStatus::Returned.direction(), DebtDirection::YouOwe);
    }

    #[test]
    fn test_new_person_gets_unique_id() {
        let a = Person::new("Alice");
        let b = Person::new("Alice");
        assert_ne!(a.id, b.id);
    }
}
