//! User document entity - The remote per-identity document.
//!
//! One row per signed-in identity holding both collections as JSON text. The row is
//! created empty on first sign-in and overwritten field by field afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Remote document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_documents")]
pub struct Model {
    /// Stable identity id, the document key
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: String,
    /// JSON array of people
    #[sea_orm(column_type = "Text")]
    pub people: String,
    /// JSON array of debts
    #[sea_orm(column_type = "Text")]
    pub debts: String,
    /// When the document was last written
    pub updated_at: DateTimeUtc,
}

/// `UserDocument` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
