//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Sign-in and sign-out
pub mod account;

/// Data export and import commands
pub mod data;

/// Debt management, listing and statistics
pub mod debt;

/// General utility commands
pub mod general;

/// People management commands
pub mod people;

// Export commands
pub use account::*;
pub use data::*;
pub use debt::*;
pub use general::*;
pub use people::*;
