//! Per-user sessions.
//!
//! A [`Session`] owns one user's [`AppState`], the [`PersistenceBridge`] behind it
//! and a [`QueryEngine`]. Every data change goes through [`Session::execute`], which
//! applies the change in memory first and then writes it through. While signed in, a
//! listener task applies remote snapshots to the same session. A user who was signed
//! in when the process stopped is signed back in when their session is reopened.

use crate::{
    core::{
        query::{DebtFilter, DebtSort, DebtView, QueryEngine},
        transfer::{self, ExportFile, ExportFormat},
    },
    errors::Result,
    models::TrackerData,
    persistence::{
        LocalStore, Notification, PersistenceBridge, PushOutcome, RemoteStore,
        RemoteSubscription, UserIdentity,
    },
    state::{AppState, PendingDebtIntent},
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::DatabaseConnection;
use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, info, instrument, warn};

/// A session shared between command handlers and the remote listener.
pub type SharedSession = Arc<Mutex<Session>>;

/// Value returned by a command plus any notifications raised while persisting it.
#[derive(Debug)]
pub struct Outcome<T> {
    /// What the command returned
    pub value: T,
    /// Non-fatal persistence failures
    pub notifications: Vec<Notification>,
}

/// Counts of what an import replaced the data with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Imported people
    pub people: usize,
    /// Imported debts
    pub debts: usize,
}

/// One user's tracker.
#[derive(Debug)]
pub struct Session {
    state: AppState,
    bridge: PersistenceBridge,
    queries: QueryEngine,
    listener: Option<JoinHandle<()>>,
}

impl Session {
    /// Opens a session, loading its data from local storage.
    pub async fn open(bridge: PersistenceBridge) -> Result<Self> {
        let state = bridge.bootstrap().await?;
        Ok(Self {
            state,
            bridge,
            queries: QueryEngine::new(),
            listener: None,
        })
    }

    /// Current data.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Signed-in identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&UserIdentity> {
        self.bridge.identity()
    }

    /// Whether remote mirroring is active.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.bridge.is_signed_in()
    }

    /// Applies `command` to the data and writes the result through.
    ///
    /// If `command` fails nothing is written. If a write fails after the change was
    /// applied, memory keeps the change.
    pub async fn execute<T, F>(&mut self, command: F) -> Result<Outcome<T>>
    where
        F: FnOnce(&mut AppState) -> Result<T>,
    {
        let value = command(&mut self.state)?;
        let notifications = self.bridge.persist(&self.state).await?;
        Ok(Outcome {
            value,
            notifications,
        })
    }

    /// Filtered, sorted debts plus statistics; cached until something changes.
    pub fn view(&mut self, filter: &DebtFilter, sort: DebtSort, today: NaiveDate) -> &DebtView {
        self.queries.view(&self.state, filter, sort, today)
    }

    /// Records that the next debt form should open for `person_id`.
    pub fn request_debt_for(&mut self, person_id: impl Into<String>, is_borrowed: bool) {
        self.state.request_debt_for(person_id, is_borrowed);
    }

    /// Consumes the pending debt intent, if any.
    pub fn take_pending_intent(&mut self) -> Option<PendingDebtIntent> {
        self.state.take_pending_intent()
    }

    /// Renders the current data as an export file.
    pub fn export(&self, format: ExportFormat, now: NaiveDateTime) -> Result<ExportFile> {
        transfer::export(&self.state.snapshot(), format, now)
    }

    /// Replaces both collections with the contents of a JSON export.
    ///
    /// A file that fails validation leaves the data untouched.
    #[instrument(skip(self, text))]
    pub async fn import(&mut self, text: &str) -> Result<Outcome<ImportSummary>> {
        let data = transfer::import_json(text)?;
        let mut outcome = self
            .execute(move |state| {
                let summary = ImportSummary {
                    people: data.people.len(),
                    debts: data.debts.len(),
                };
                state.replace_all(data);
                Ok(summary)
            })
            .await?;

        let imported = Notification::info(format!(
            "Imported {} people and {} debts",
            outcome.value.people, outcome.value.debts
        ));
        outcome.notifications.insert(0, imported);
        Ok(outcome)
    }

    /// Applies a remote snapshot to this session.
    pub async fn apply_remote_push(&mut self, document: TrackerData) -> Result<PushOutcome> {
        self.bridge.apply_remote_push(&mut self.state, document).await
    }

    fn stop_listener(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

/// Signs `session` in and starts applying remote snapshots to it.
///
/// The first snapshot is the remote document as it stands, so remote data replaces
/// whatever differs locally right after signing in.
pub async fn sign_in(session: &SharedSession, identity: UserIdentity) -> Result<()> {
    let mut guard = session.lock().await;
    guard.stop_listener();
    let subscription = guard.bridge.sign_in(identity).await?;
    guard.listener = Some(tokio::spawn(listen(Arc::downgrade(session), subscription)));
    Ok(())
}

/// Stops remote mirroring for `session`. Local data and storage are kept.
pub async fn sign_out(session: &SharedSession) -> Result<Option<UserIdentity>> {
    let mut guard = session.lock().await;
    let identity = guard.bridge.sign_out().await?;
    guard.stop_listener();
    Ok(identity)
}

/// Signs `session` back in with the identity remembered by an earlier sign-in.
///
/// Returns the restored identity; `None` when nobody was signed in or the session
/// already is.
pub async fn restore_sign_in(session: &SharedSession) -> Result<Option<UserIdentity>> {
    let stored = {
        let guard = session.lock().await;
        if guard.is_signed_in() {
            return Ok(None);
        }
        guard.bridge.stored_identity().await?
    };
    let Some(identity) = stored else {
        return Ok(None);
    };
    sign_in(session, identity.clone()).await?;
    Ok(Some(identity))
}

async fn listen(session: Weak<Mutex<Session>>, mut subscription: RemoteSubscription) {
    while let Some(document) = subscription.next().await {
        let Some(session) = session.upgrade() else {
            break;
        };
        let mut guard = session.lock().await;
        if let Err(e) = guard.apply_remote_push(document).await {
            error!("Failed to apply remote update: {e}");
        }
    }
    tracing::debug!("Remote listener stopped");
}

/// Open sessions, keyed by profile.
#[derive(Debug)]
pub struct SessionRegistry {
    local_db: DatabaseConnection,
    remote: RemoteStore,
    sessions: Mutex<HashMap<String, SharedSession>>,
}

impl SessionRegistry {
    /// Creates an empty registry over the given databases.
    #[must_use]
    pub fn new(local_db: DatabaseConnection, remote: RemoteStore) -> Self {
        Self {
            local_db,
            remote,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The open session for `profile`, if any.
    pub async fn get(&self, profile: &str) -> Option<SharedSession> {
        self.sessions.lock().await.get(profile).map(Arc::clone)
    }

    /// The session for `profile`, opening it from local storage if needed.
    ///
    /// A newly opened session is signed back in if it was signed in before. When that
    /// fails the session opens signed out and the user can sign in again.
    pub async fn open(&self, profile: &str) -> Result<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(profile) {
            return Ok(Arc::clone(session));
        }

        let local = LocalStore::new(self.local_db.clone(), profile);
        let bridge = PersistenceBridge::new(local, self.remote.clone());
        let session = Arc::new(Mutex::new(Session::open(bridge).await?));
        match restore_sign_in(&session).await {
            Ok(Some(identity)) => {
                info!("Restored sign-in of {} for profile {profile}", identity.display_name);
            }
            Ok(None) => {}
            Err(e) => warn!("Could not restore sign-in for profile {profile}: {e}"),
        }

        sessions.insert(profile.to_string(), Arc::clone(&session));
        info!("Opened session for profile {profile}");
        Ok(session)
    }
}
