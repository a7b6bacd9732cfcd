//! Core business logic - framework-agnostic operations on the people and debts collections.

/// Debt creation, editing, status toggling and removal
pub mod debt;
/// Person creation, renaming, removal and per-person summaries
pub mod person;
/// Filtering, sorting and aggregate statistics over debts
pub mod query;
/// Display formatting for debts, people and statistics
pub mod report;
/// JSON/CSV export and JSON import
pub mod transfer;
