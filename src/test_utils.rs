//! Shared test utilities for the debt tracker.
//!
//! Helpers for building in-memory databases and test records with sensible defaults.

use crate::{
    config::database::{create_local_tables, create_remote_tables},
    errors::Result,
    models::{Debt, DebtStatus, Person},
    persistence::{LocalStore, PersistenceBridge, RemoteStore, UserIdentity},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Builds a date, panicking on invalid input. Tests only.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a person with a fixed id.
pub fn sample_person(id: &str, name: &str) -> Person {
    Person {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// Creates a debt with a fixed id.
///
/// # Defaults
/// * `date`: 2024-01-15
/// * `description`: empty
/// * `expected_return_date`: none
pub fn sample_debt(id: &str, person_id: &str, amount: f64, status: DebtStatus) -> Debt {
    Debt {
        id: id.to_string(),
        person_id: person_id.to_string(),
        amount,
        description: String::new(),
        date: date(2024, 1, 15),
        expected_return_date: None,
        status,
    }
}

/// Identity whose display name is derived from `uid`.
pub fn identity(uid: &str) -> UserIdentity {
    UserIdentity {
        uid: uid.to_string(),
        display_name: format!("User {uid}"),
    }
}

/// Creates an in-memory `SQLite` database with the local storage table.
pub async fn setup_local_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    create_local_tables(&db).await?;
    Ok(db)
}

/// Creates an in-memory `SQLite` database with the remote document table.
pub async fn setup_remote_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    create_remote_tables(&db).await?;
    Ok(db)
}

/// Remote store on a fresh in-memory database.
pub async fn setup_remote_store() -> Result<RemoteStore> {
    Ok(RemoteStore::new(setup_remote_db().await?))
}

/// Unauthenticated bridge for `profile`, sharing `remote` with other bridges.
pub async fn setup_bridge(profile: &str, remote: &RemoteStore) -> Result<PersistenceBridge> {
    let local = LocalStore::new(setup_local_db().await?, profile);
    Ok(PersistenceBridge::new(local, remote.clone()))
}
