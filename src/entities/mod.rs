//! Entity module - Contains all SeaORM entity definitions for the database.
//! `local_entry` lives in the local database, `user_document` in the remote one.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod local_entry;
pub mod user_document;

// Re-export specific types to avoid conflicts
pub use local_entry::{Column as LocalEntryColumn, Entity as LocalEntry, Model as LocalEntryModel};
pub use user_document::{
    Column as UserDocumentColumn, Entity as UserDocument, Model as UserDocumentModel,
};
