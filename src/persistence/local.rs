//! Device-local durable storage.
//!
//! A tiny key/value store on top of the `local_entries` table. The tracker uses two
//! keys, [`PEOPLE_KEY`] and [`DEBTS_KEY`], each holding the verbatim JSON of one
//! collection. [`IDENTITY_KEY`] remembers who is signed in across restarts. Entries
//! are scoped to a profile.

use crate::{
    entities::{LocalEntry, local_entry},
    errors::Result,
    models::{Debt, Person},
    persistence::bridge::UserIdentity,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde::{Serialize, de::DeserializeOwned};

/// Key holding the people collection.
pub const PEOPLE_KEY: &str = "people";
/// Key holding the debts collection.
pub const DEBTS_KEY: &str = "debts";
/// Key holding the signed-in identity.
pub const IDENTITY_KEY: &str = "identity";

/// Key/value storage for one profile.
#[derive(Debug, Clone)]
pub struct LocalStore {
    db: DatabaseConnection,
    profile: String,
}

impl LocalStore {
    /// Creates a store scoped to `profile`.
    #[must_use]
    pub fn new(db: DatabaseConnection, profile: impl Into<String>) -> Self {
        Self {
            db,
            profile: profile.into(),
        }
    }

    /// Profile this store reads and writes.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    async fn find_entry(&self, key: &str) -> Result<Option<local_entry::Model>> {
        LocalEntry::find()
            .filter(local_entry::Column::Profile.eq(self.profile.as_str()))
            .filter(local_entry::Column::Key.eq(key))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    /// Raw stored value for `key`.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.find_entry(key).await?.map(|entry| entry.value))
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let now = Utc::now().naive_utc();

        if let Some(entry) = self.find_entry(key).await? {
            let mut active_model: local_entry::ActiveModel = entry.into();
            active_model.value = Set(value);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let active_model = local_entry::ActiveModel {
                profile: Set(self.profile.clone()),
                key: Set(key.to_string()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            };
            active_model.insert(&self.db).await?;
        }

        tracing::debug!("Wrote local key '{key}' for profile {}", self.profile);
        Ok(())
    }

    /// Deletes `key`; deleting a missing key is not an error.
    pub async fn remove_raw(&self, key: &str) -> Result<()> {
        LocalEntry::delete_many()
            .filter(local_entry::Column::Profile.eq(self.profile.as_str()))
            .filter(local_entry::Column::Key.eq(key))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set_raw(key, serde_json::to_string(value)?).await
    }

    /// Stored people, `None` if never written.
    pub async fn load_people(&self) -> Result<Option<Vec<Person>>> {
        self.load(PEOPLE_KEY).await
    }

    /// Stored debts, `None` if never written.
    pub async fn load_debts(&self) -> Result<Option<Vec<Debt>>> {
        self.load(DEBTS_KEY).await
    }

    /// Overwrites the stored people.
    pub async fn save_people(&self, people: &[Person]) -> Result<()> {
        self.save(PEOPLE_KEY, people).await
    }

    /// Overwrites the stored debts.
    pub async fn save_debts(&self, debts: &[Debt]) -> Result<()> {
        self.save(DEBTS_KEY, debts).await
    }

    /// Identity saved by the last sign-in, if it was not signed out since.
    pub async fn load_identity(&self) -> Result<Option<UserIdentity>> {
        self.load(IDENTITY_KEY).await
    }

    /// Remembers `identity` as signed in.
    pub async fn save_identity(&self, identity: &UserIdentity) -> Result<()> {
        self.save(IDENTITY_KEY, identity).await
    }

    /// Forgets the signed-in identity.
    pub async fn clear_identity(&self) -> Result<()> {
        self.remove_raw(IDENTITY_KEY).await
    }
}
