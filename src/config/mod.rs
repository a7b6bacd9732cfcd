/// Database connections and table creation
pub mod database;

/// Application settings loading from config.toml
pub mod settings;
