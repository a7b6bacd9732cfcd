//! Local entry entity - The device-local key/value store.
//!
//! Each row holds one JSON-serialized collection (`"people"` or `"debts"`) for one
//! profile. Profiles keep several users of the same bot installation apart.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Local key/value database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "local_entries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Profile the entry belongs to
    pub profile: String,
    /// Storage key (e.g., `"people"`)
    pub key: String,
    /// JSON-serialized value
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this entry was last written
    pub updated_at: DateTime,
}

/// `LocalEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
