//! Remote per-identity document store.
//!
//! Each signed-in identity owns one document (`user_documents` row) holding both
//! collections. A write replaces any subset of the fields in one update, last write
//! wins. Every write publishes exactly one snapshot to the identity's broadcast
//! channel, which is how sessions observe changes made elsewhere (and echoes of their
//! own writes).

use crate::{
    entities::{UserDocument, user_document},
    errors::{Error, Result},
    models::{Debt, Person, TrackerData},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::broadcast::{self, error::RecvError};

const CHANNEL_CAPACITY: usize = 32;

/// Fields of the remote document to overwrite; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    /// New `people` field
    pub people: Option<Vec<Person>>,
    /// New `debts` field
    pub debts: Option<Vec<Debt>>,
}

impl DocumentPatch {
    /// Patch replacing only `people`.
    #[must_use]
    pub const fn people(people: Vec<Person>) -> Self {
        Self {
            people: Some(people),
            debts: None,
        }
    }

    /// Patch replacing only `debts`.
    #[must_use]
    pub const fn debts(debts: Vec<Debt>) -> Self {
        Self {
            people: None,
            debts: Some(debts),
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.people.is_none() && self.debts.is_none()
    }

    /// Names of the patched fields, for messages.
    #[must_use]
    pub const fn fields(&self) -> &'static str {
        match (self.people.is_some(), self.debts.is_some()) {
            (true, true) => "people and debts",
            (true, false) => "people",
            (false, true) => "debts",
            (false, false) => "no",
        }
    }
}

/// Handle to the remote document database plus the in-process change feed.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    db: DatabaseConnection,
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<TrackerData>>>>,
}

fn decode(model: &user_document::Model) -> Result<TrackerData> {
    let decode_field = |e: serde_json::Error| Error::Remote {
        message: format!("stored document for {} is malformed: {e}", model.uid),
    };
    Ok(TrackerData {
        people: serde_json::from_str(&model.people).map_err(decode_field)?,
        debts: serde_json::from_str(&model.debts).map_err(decode_field)?,
    })
}

impl RemoteStore {
    /// Wraps a connection to the remote database.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn receiver(&self, uid: &str) -> broadcast::Receiver<TrackerData> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(uid.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    fn publish(&self, uid: &str, document: TrackerData) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = channels.get(uid) else {
            return;
        };
        // Sending only fails once every receiver is gone
        if sender.send(document).is_err() {
            channels.remove(uid);
            tracing::trace!("Closed change feed for {uid}, no subscribers left");
        }
    }

    /// Reads the document for `uid`, `None` if it was never created.
    pub async fn fetch(&self, uid: &str) -> Result<Option<TrackerData>> {
        let model = UserDocument::find_by_id(uid.to_string())
            .one(&self.db)
            .await
            .map_err(|e| Error::remote(&e))?;
        model.as_ref().map(decode).transpose()
    }

    /// Creates an empty document for `uid`.
    pub async fn initialize(&self, uid: &str) -> Result<TrackerData> {
        let empty = TrackerData::default();
        let active_model = user_document::ActiveModel {
            uid: Set(uid.to_string()),
            people: Set(serde_json::to_string(&empty.people)?),
            debts: Set(serde_json::to_string(&empty.debts)?),
            updated_at: Set(Utc::now()),
        };
        active_model
            .insert(&self.db)
            .await
            .map_err(|e| Error::remote(&e))?;

        tracing::info!("Initialized remote document for {uid}");
        self.publish(uid, empty.clone());
        Ok(empty)
    }

    /// Overwrites the patched fields of an existing document in one write and
    /// publishes the result. Returns the document as written.
    ///
    /// Fails if the document does not exist.
    pub async fn update(&self, uid: &str, patch: DocumentPatch) -> Result<TrackerData> {
        let model = UserDocument::find_by_id(uid.to_string())
            .one(&self.db)
            .await
            .map_err(|e| Error::remote(&e))?
            .ok_or_else(|| Error::Remote {
                message: format!("no document exists for {uid}"),
            })?;

        let fields = patch.fields();
        let mut active_model: user_document::ActiveModel = model.into();
        if let Some(people) = &patch.people {
            active_model.people = Set(serde_json::to_string(people)?);
        }
        if let Some(debts) = &patch.debts {
            active_model.debts = Set(serde_json::to_string(debts)?);
        }
        active_model.updated_at = Set(Utc::now());

        let saved = active_model
            .update(&self.db)
            .await
            .map_err(|e| Error::remote(&e))?;
        let document = decode(&saved)?;

        tracing::debug!("Updated remote {fields} for {uid}");
        self.publish(uid, document.clone());
        Ok(document)
    }

    /// Starts a subscription to `uid`'s document.
    ///
    /// The first value yielded is the document as it is now (if it exists), followed
    /// by every later write in the order it happened.
    pub async fn subscribe(&self, uid: &str) -> Result<RemoteSubscription> {
        // Subscribe before reading so no write can fall between the two
        let receiver = self.receiver(uid);
        let initial = self.fetch(uid).await?;
        Ok(RemoteSubscription { initial, receiver })
    }
}

/// Stream of document snapshots for one identity.
#[derive(Debug)]
pub struct RemoteSubscription {
    initial: Option<TrackerData>,
    receiver: broadcast::Receiver<TrackerData>,
}

impl RemoteSubscription {
    /// Waits for the next snapshot; `None` once the store is gone.
    pub async fn next(&mut self) -> Option<TrackerData> {
        if let Some(document) = self.initial.take() {
            return Some(document);
        }
        loop {
            match self.receiver.recv().await {
                Ok(document) => return Some(document),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Remote subscription lagged, skipped {skipped} snapshot(s)");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
