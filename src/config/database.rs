//! Database configuration module.
//!
//! The tracker talks to two databases: the local one that backs device storage and
//! the remote one that holds per-identity documents. Both are reached through
//! `SeaORM`, and their tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models.

use crate::entities::{LocalEntry, UserDocument};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;

const DEFAULT_LOCAL_URL: &str = "sqlite://data/debt_tracker.sqlite?mode=rwc";
const DEFAULT_REMOTE_URL: &str = "sqlite://data/debt_tracker_remote.sqlite?mode=rwc";

/// Gets the local database URL from `LOCAL_DATABASE_URL`, then `configured`, then the default.
#[must_use]
pub fn get_local_database_url(configured: Option<&str>) -> String {
    std::env::var("LOCAL_DATABASE_URL")
        .ok()
        .or_else(|| configured.map(ToString::to_string))
        .unwrap_or_else(|| DEFAULT_LOCAL_URL.to_string())
}

/// Gets the remote database URL from `REMOTE_DATABASE_URL`, then `configured`, then the default.
#[must_use]
pub fn get_remote_database_url(configured: Option<&str>) -> String {
    std::env::var("REMOTE_DATABASE_URL")
        .ok()
        .or_else(|| configured.map(ToString::to_string))
        .unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string())
}

/// Creates the directory holding a file-backed `SQLite` database.
fn ensure_parent_dir(url: &str) -> Result<()> {
    let Some(path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Opens a connection to `url`.
pub async fn create_connection(url: &str) -> Result<DatabaseConnection> {
    ensure_parent_dir(url)?;
    tracing::debug!("Connecting to database at {url}");
    Database::connect(url).await.map_err(Into::into)
}

async fn create_table_for<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    Ok(())
}

/// Creates the device-local storage table.
pub async fn create_local_tables(db: &DatabaseConnection) -> Result<()> {
    create_table_for(db, LocalEntry).await
}

/// Creates the remote document table.
pub async fn create_remote_tables(db: &DatabaseConnection) -> Result<()> {
    create_table_for(db, UserDocument).await
}
