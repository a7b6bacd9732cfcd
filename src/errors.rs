//! Unified error types for the debt tracker.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants are grouped
//! by where the failure originates: configuration, local storage, the remote
//! document store, user input, and the Discord framework.

use thiserror::Error;

/// All errors produced by the debt tracker.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// Local database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored or imported value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No person with this id exists
    #[error("Person not found: {id}")]
    PersonNotFound {
        /// The id that was looked up
        id: String,
    },

    /// No debt with this id exists
    #[error("Debt not found: {id}")]
    DebtNotFound {
        /// The id that was looked up
        id: String,
    },

    /// Person names must contain at least one non-whitespace character
    #[error("Name cannot be empty")]
    InvalidName,

    /// Amount is negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A date was not in `YYYY-MM-DD` form
    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input
        value: String,
    },

    /// Removing this person needs explicit confirmation
    #[error("{name} still has {count} debt(s); confirm to remove them as well")]
    PersonHasDebts {
        /// Name of the person
        name: String,
        /// Number of debts referencing the person
        count: usize,
    },

    /// An import file did not match the export schema
    #[error("Invalid import file: {message}")]
    InvalidImport {
        /// What was wrong with the file
        message: String,
    },

    /// The remote document store or identity handshake failed
    #[error("Remote store error: {message}")]
    Remote {
        /// Underlying failure
        message: String,
    },

    /// The operation requires a signed-in identity
    #[error("Please sign in first with `/signin`")]
    NotSignedIn,

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Wraps a remote-side database error so it is reported as a remote failure
    /// instead of a local one.
    #[must_use]
    pub fn remote(err: &sea_orm::DbErr) -> Self {
        Self::Remote {
            message: err.to_string(),
        }
    }

    /// Whether the error is caused by user input or state and should be shown to
    /// the user as is, rather than reported as an internal failure.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::PersonNotFound { .. }
                | Self::DebtNotFound { .. }
                | Self::InvalidName
                | Self::InvalidAmount { .. }
                | Self::InvalidDate { .. }
                | Self::PersonHasDebts { .. }
                | Self::InvalidImport { .. }
                | Self::NotSignedIn
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_errors() {
        assert!(Error::InvalidName.is_user_facing());
        assert!(Error::NotSignedIn.is_user_facing());
        assert!(
            Error::PersonHasDebts {
                name: "Alice".to_string(),
                count: 2
            }
            .is_user_facing()
        );
        assert!(
            !Error::Remote {
                message: "timeout".to_string()
            }
            .is_user_facing()
        );
        assert!(!Error::Database(sea_orm::DbErr::Custom("boom".to_string())).is_user_facing());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::PersonHasDebts {
                name: "Alice".to_string(),
                count: 2
            }
            .to_string(),
            "Alice still has 2 debt(s); confirm to remove them as well"
        );
        assert_eq!(
            Error::NotSignedIn.to_string(),
            "Please sign in first with `/signin`"
        );
    }
}
