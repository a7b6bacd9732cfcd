//! Persistence bridge - keeps the in-memory collections, local storage and the
//! remote document in step.
//!
//! Lifecycle per session:
//! 1. [`PersistenceBridge::bootstrap`] loads both collections from local storage, and
//!    [`PersistenceBridge::stored_identity`] tells whether the user was signed in
//!    when the session last ran.
//! 2. Without an identity the bridge works on local storage only.
//! 3. [`PersistenceBridge::sign_in`] makes sure the identity's remote document exists
//!    (creating it empty), remembers the identity locally and returns a subscription
//!    to the document.
//! 4. Remote snapshots are applied with [`PersistenceBridge::apply_remote_push`]; the
//!    remote side wins. Local mutations are written through with
//!    [`PersistenceBridge::persist`], which only touches a collection whose value
//!    differs from what local storage holds, and sends every changed collection in a
//!    single remote write. That comparison is what stops a remote snapshot from being
//!    echoed straight back.
//!
//! Snapshots of this bridge's own writes come back through the subscription. An echo
//! of a write that was since superseded by a newer write from the same bridge is
//! skipped, so it can never roll memory back to an older state.
//!
//! There is no merge: concurrent writers overwrite each other and the last write
//! observed wins.

use crate::{
    errors::Result,
    models::TrackerData,
    persistence::{
        local::LocalStore,
        notify::Notification,
        remote::{DocumentPatch, RemoteStore, RemoteSubscription},
    },
    state::AppState,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, instrument};

/// Most own writes remembered while their echoes are outstanding
const MAX_PENDING_ECHOES: usize = 32;

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Stable unique id, used as the remote document key
    pub uid: String,
    /// Name to greet the user with
    pub display_name: String,
}

/// Which collections a remote snapshot replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// `people` differed and was overwritten
    pub people_changed: bool,
    /// `debts` differed and was overwritten
    pub debts_changed: bool,
}

impl PushOutcome {
    /// Whether anything was overwritten.
    #[must_use]
    pub const fn changed(self) -> bool {
        self.people_changed || self.debts_changed
    }
}

/// Local storage, remote store and the current identity for one session.
#[derive(Debug, Clone)]
pub struct PersistenceBridge {
    local: LocalStore,
    remote: RemoteStore,
    identity: Option<UserIdentity>,
    /// Documents written by this bridge whose echoes have not arrived yet, oldest first
    pending_echoes: VecDeque<TrackerData>,
}

impl PersistenceBridge {
    /// Creates an unauthenticated bridge.
    #[must_use]
    pub const fn new(local: LocalStore, remote: RemoteStore) -> Self {
        Self {
            local,
            remote,
            identity: None,
            pending_echoes: VecDeque::new(),
        }
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    /// Whether remote mirroring is active.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Local storage backing this bridge.
    #[must_use]
    pub const fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Loads the collections from local storage; missing keys load as empty.
    #[instrument(skip(self), fields(profile = %self.local.profile()))]
    pub async fn bootstrap(&self) -> Result<AppState> {
        let people = self.local.load_people().await?.unwrap_or_default();
        let debts = self.local.load_debts().await?.unwrap_or_default();
        info!(
            "Loaded {} people and {} debts from local storage",
            people.len(),
            debts.len()
        );
        Ok(AppState::new(people, debts))
    }

    /// Identity that was signed in when this profile last ran, if any.
    pub async fn stored_identity(&self) -> Result<Option<UserIdentity>> {
        self.local.load_identity().await
    }

    /// Binds `identity`, creating its remote document if needed, and subscribes to it.
    ///
    /// On failure the bridge stays unauthenticated.
    #[instrument(skip(self, identity), fields(uid = %identity.uid))]
    pub async fn sign_in(&mut self, identity: UserIdentity) -> Result<RemoteSubscription> {
        if self.remote.fetch(&identity.uid).await?.is_none() {
            self.remote.initialize(&identity.uid).await?;
        }
        let subscription = self.remote.subscribe(&identity.uid).await?;
        self.local.save_identity(&identity).await?;

        info!("Signed in as {}", identity.display_name);
        self.pending_echoes.clear();
        self.identity = Some(identity);
        Ok(subscription)
    }

    /// Drops the identity, here and in local storage; local data keeps working.
    ///
    /// If the stored identity cannot be cleared the bridge stays signed in.
    pub async fn sign_out(&mut self) -> Result<Option<UserIdentity>> {
        self.local.clear_identity().await?;
        self.pending_echoes.clear();
        let identity = self.identity.take();
        if let Some(identity) = &identity {
            info!("Signed out {}", identity.display_name);
        }
        Ok(identity)
    }

    /// Whether `document` is the echo of an own write that a later own write replaced.
    /// Forgets every own write up to and including the matching one.
    fn is_stale_echo(&mut self, document: &TrackerData) -> bool {
        let Some(position) = self.pending_echoes.iter().position(|sent| sent == document) else {
            return false;
        };
        let superseded = position + 1 < self.pending_echoes.len();
        self.pending_echoes.drain(..=position);
        superseded
    }

    fn remember_echo(&mut self, written: TrackerData) {
        if self.pending_echoes.len() == MAX_PENDING_ECHOES {
            self.pending_echoes.pop_front();
        }
        self.pending_echoes.push_back(written);
    }

    /// Applies a remote snapshot: every collection that differs from memory is
    /// overwritten in local storage and then in memory. Equal collections are left
    /// alone, including their local storage entries. Stale echoes of this bridge's
    /// own writes are skipped.
    pub async fn apply_remote_push(
        &mut self,
        state: &mut AppState,
        document: TrackerData,
    ) -> Result<PushOutcome> {
        let mut outcome = PushOutcome::default();
        if !self.is_signed_in() {
            debug!("Ignoring remote snapshot while signed out");
            return Ok(outcome);
        }
        if self.is_stale_echo(&document) {
            debug!("Skipping echo of a superseded write");
            return Ok(outcome);
        }

        let TrackerData { people, debts } = document;
        if state.people() != people.as_slice() {
            self.local.save_people(&people).await?;
            state.replace_people(people);
            outcome.people_changed = true;
        }
        if state.debts() != debts.as_slice() {
            self.local.save_debts(&debts).await?;
            state.replace_debts(debts);
            outcome.debts_changed = true;
        }

        if outcome.changed() {
            info!(
                "Applied remote update (people: {}, debts: {})",
                outcome.people_changed, outcome.debts_changed
            );
        }
        Ok(outcome)
    }

    /// Writes memory through to local storage and, when signed in, to the remote
    /// document. Only collections that differ from local storage are written, and all
    /// of them go to the remote document in one write.
    ///
    /// Local storage failures are returned as errors. Remote failures become error
    /// notifications and are not retried; local storage stays authoritative.
    pub async fn persist(&mut self, state: &AppState) -> Result<Vec<Notification>> {
        let stored_people = self.local.load_people().await?.unwrap_or_default();
        let stored_debts = self.local.load_debts().await?.unwrap_or_default();
        let people_dirty = state.people() != stored_people.as_slice();
        let debts_dirty = state.debts() != stored_debts.as_slice();

        if people_dirty {
            self.local.save_people(state.people()).await?;
        }
        if debts_dirty {
            self.local.save_debts(state.debts()).await?;
        }

        let mut notifications = Vec::new();
        let Some(uid) = self.identity.as_ref().map(|identity| identity.uid.clone()) else {
            return Ok(notifications);
        };

        let patch = DocumentPatch {
            people: people_dirty.then(|| state.people().to_vec()),
            debts: debts_dirty.then(|| state.debts().to_vec()),
        };
        if patch.is_empty() {
            return Ok(notifications);
        }

        let fields = patch.fields();
        match self.remote.update(&uid, patch).await {
            Ok(written) => self.remember_echo(written),
            Err(e) => notifications.push(
                Notification::error(format!("Failed to save {fields} data"))
                    .with_description(e.to_string()),
            ),
        }
        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{debt, person},
        errors::Error,
        models::DebtStatus,
        test_utils::{
            date, identity, sample_debt, sample_person, setup_local_db, setup_remote_db,
        },
    };
    use sea_orm::{ConnectionTrait, DatabaseConnection};

    async fn bridge() -> Result<(PersistenceBridge, DatabaseConnection)> {
        let remote_db = setup_remote_db().await?;
        let bridge = PersistenceBridge::new(
            LocalStore::new(setup_local_db().await?, "device"),
            RemoteStore::new(remote_db.clone()),
        );
        Ok((bridge, remote_db))
    }

    async fn take_remote_offline(db: &DatabaseConnection) -> Result<()> {
        db.execute_unprepared("DROP TABLE user_documents").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_from_empty_storage() -> Result<()> {
        let (bridge, _) = bridge().await?;
        let state = bridge.bootstrap().await?;
        assert!(state.people().is_empty());
        assert!(state.debts().is_empty());
        assert!(!bridge.is_signed_in());
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_reads_saved_collections() -> Result<()> {
        let (bridge, _) = bridge().await?;
        bridge.local().save_people(&[sample_person("p1", "Alice")]).await?;
        bridge
            .local()
            .save_debts(&[sample_debt("d1", "p1", 5.0, DebtStatus::Given)])
            .await?;

        let state = bridge.bootstrap().await?;
        assert_eq!(state.people().len(), 1);
        assert_eq!(state.debts().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_creates_empty_document() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        let mut subscription = bridge.sign_in(identity("uid-1")).await?;

        assert!(bridge.is_signed_in());
        assert_eq!(subscription.next().await, Some(TrackerData::default()));

        let remote = RemoteStore::new(remote_db);
        assert_eq!(remote.fetch("uid-1").await?, Some(TrackerData::default()));
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_keeps_existing_document() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        let remote = RemoteStore::new(remote_db);
        remote.initialize("uid-1").await?;
        remote
            .update("uid-1", DocumentPatch::people(vec![sample_person("p1", "Alice")]))
            .await?;

        let mut subscription = bridge.sign_in(identity("uid-1")).await?;
        let first = subscription.next().await.unwrap();
        assert_eq!(first.people[0].name, "Alice");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_sign_in_stays_unauthenticated() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        take_remote_offline(&remote_db).await?;

        let result = bridge.sign_in(identity("uid-1")).await;
        assert!(matches!(result, Err(Error::Remote { .. })));
        assert!(!bridge.is_signed_in());
        assert!(bridge.stored_identity().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_is_remembered_locally() -> Result<()> {
        let (mut bridge, _) = bridge().await?;
        assert!(bridge.stored_identity().await?.is_none());

        bridge.sign_in(identity("uid-1")).await?;
        assert_eq!(bridge.stored_identity().await?, Some(identity("uid-1")));
        Ok(())
    }

    #[tokio::test]
    async fn test_persist_without_identity_is_local_only() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        person::add_person(&mut state, "Alice")?;

        let notifications = bridge.persist(&state).await?;
        assert!(notifications.is_empty());
        assert_eq!(bridge.local().load_people().await?.unwrap().len(), 1);
        assert!(RemoteStore::new(remote_db).fetch("uid-1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_persist_writes_through_to_remote() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        bridge.sign_in(identity("uid-1")).await?;

        let alice = person::add_person(&mut state, "Alice")?;
        let mut draft = debt::DebtDraft::for_person(alice.id, false, date(2024, 1, 1));
        draft.amount = 25.0;
        debt::add_debt(&mut state, draft)?;
        assert!(bridge.persist(&state).await?.is_empty());

        let remote = RemoteStore::new(remote_db).fetch("uid-1").await?.unwrap();
        assert_eq!(remote, state.snapshot());
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_write_failure_is_reported_and_local_kept() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        bridge.sign_in(identity("uid-1")).await?;
        take_remote_offline(&remote_db).await?;

        person::add_person(&mut state, "Alice")?;
        let notifications = bridge.persist(&state).await?;

        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].is_error());
        assert_eq!(notifications[0].title, "Failed to save people data");
        assert_eq!(bridge.local().load_people().await?.unwrap().len(), 1);
        assert_eq!(state.people().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unchanged_collections_are_not_written() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        bridge.sign_in(identity("uid-1")).await?;
        person::add_person(&mut state, "Alice")?;
        bridge.persist(&state).await?;

        // Any remote write would now fail loudly
        take_remote_offline(&remote_db).await?;
        assert!(bridge.persist(&state).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_equal_remote_push_does_not_touch_storage() -> Result<()> {
        let (mut bridge, _) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        bridge.sign_in(identity("uid-1")).await?;
        let revision = state.revision();

        let outcome = bridge
            .apply_remote_push(&mut state, TrackerData::default())
            .await?;

        assert!(!outcome.changed());
        assert_eq!(state.revision(), revision);
        // Never written, so still absent rather than rewritten as []
        assert!(bridge.local().load_people().await?.is_none());
        assert!(bridge.local().load_debts().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_push_wins_over_local() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        bridge.sign_in(identity("uid-1")).await?;
        person::add_person(&mut state, "Local")?;
        bridge.persist(&state).await?;

        let incoming = TrackerData {
            people: vec![sample_person("p9", "Remote")],
            debts: Vec::new(),
        };
        let outcome = bridge.apply_remote_push(&mut state, incoming.clone()).await?;

        assert!(outcome.people_changed);
        assert!(!outcome.debts_changed);
        assert_eq!(state.people(), incoming.people.as_slice());
        assert_eq!(bridge.local().load_people().await?, Some(incoming.people));

        // The applied snapshot is not echoed back
        take_remote_offline(&remote_db).await?;
        assert!(bridge.persist(&state).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_cascade_removal_survives_own_echo() -> Result<()> {
        let (mut bridge, remote_db) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        let mut feed = bridge.sign_in(identity("uid-1")).await?;
        feed.next().await;

        let alice = person::add_person(&mut state, "Alice")?;
        let mut draft = debt::DebtDraft::for_person(alice.id.clone(), false, date(2024, 1, 1));
        draft.amount = 30.0;
        let lent = debt::add_debt(&mut state, draft)?;
        bridge.persist(&state).await?;
        let echo = feed.next().await.unwrap();
        assert!(!bridge.apply_remote_push(&mut state, echo).await?.changed());

        // Removes Alice and her debt; both fields travel in one snapshot
        person::confirm_remove_person(&mut state, &alice.id)?;
        bridge.persist(&state).await?;
        let echo = feed.next().await.unwrap();
        assert_eq!(echo, TrackerData::default());
        assert!(!bridge.apply_remote_push(&mut state, echo).await?.changed());
        assert!(state.debts().is_empty());
        assert!(bridge.local().load_debts().await?.unwrap().is_empty());

        assert!(debt::toggle_debt_status(&mut state, &lent.id).is_err());
        bridge.persist(&state).await?;
        let remote = RemoteStore::new(remote_db).fetch("uid-1").await?;
        assert_eq!(remote, Some(TrackerData::default()));
        Ok(())
    }

    #[tokio::test]
    async fn test_superseded_echo_does_not_roll_back() -> Result<()> {
        let (mut bridge, _) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        let mut feed = bridge.sign_in(identity("uid-1")).await?;
        feed.next().await;

        person::add_person(&mut state, "Alice")?;
        bridge.persist(&state).await?;
        person::add_person(&mut state, "Bob")?;
        bridge.persist(&state).await?;

        let first = feed.next().await.unwrap();
        assert_eq!(first.people.len(), 1);
        assert!(!bridge.apply_remote_push(&mut state, first).await?.changed());
        assert_eq!(state.people().len(), 2);
        assert_eq!(bridge.local().load_people().await?.unwrap().len(), 2);

        let second = feed.next().await.unwrap();
        assert!(!bridge.apply_remote_push(&mut state, second).await?.changed());
        assert_eq!(state.people().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_pushes_ignored_after_sign_out() -> Result<()> {
        let (mut bridge, _) = bridge().await?;
        let mut state = bridge.bootstrap().await?;
        bridge.sign_in(identity("uid-1")).await?;
        assert_eq!(
            bridge.sign_out().await?.map(|i| i.uid),
            Some("uid-1".to_string())
        );
        assert!(bridge.stored_identity().await?.is_none());

        let incoming = TrackerData {
            people: vec![sample_person("p9", "Remote")],
            debts: Vec::new(),
        };
        let outcome = bridge.apply_remote_push(&mut state, incoming).await?;
        assert!(!outcome.changed());
        assert!(state.people().is_empty());
        Ok(())
    }
}
