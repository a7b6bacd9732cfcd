//! Durable storage for the tracker: device-local storage, the remote per-identity
//! document, and the bridge that keeps them in step with memory.

/// Reconciles memory, local storage and the remote document
pub mod bridge;
/// Device-local key/value storage
pub mod local;
/// User-facing notifications for non-fatal failures
pub mod notify;
/// Remote per-identity document store with change subscriptions
pub mod remote;

pub use bridge::{PersistenceBridge, PushOutcome, UserIdentity};
pub use local::LocalStore;
pub use notify::{Notification, NotificationLevel};
pub use remote::{DocumentPatch, RemoteStore, RemoteSubscription};
