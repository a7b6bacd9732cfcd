use debt_tracker::{
    bot::{self, BotData},
    config::{database, settings},
    errors::{Error, Result},
    persistence::RemoteStore,
    session::SessionRegistry,
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load config.toml (defaults when absent)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Connect local storage and the remote document store
    let local_url = database::get_local_database_url(settings.storage.local_database_url.as_deref());
    let local_db = database::create_connection(&local_url)
        .await
        .inspect_err(|e| error!("Failed to open local database: {e}"))?;
    database::create_local_tables(&local_db).await?;
    info!("Local storage ready.");

    let remote_url =
        database::get_remote_database_url(settings.storage.remote_database_url.as_deref());
    let remote_db = database::create_connection(&remote_url)
        .await
        .inspect_err(|e| error!("Failed to open remote database: {e}"))?;
    database::create_remote_tables(&remote_db).await?;
    info!("Remote document store ready.");

    // 5. Run the bot; the token is read directly before use
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    let sessions = SessionRegistry::new(local_db, RemoteStore::new(remote_db));
    bot::run_bot(token, BotData::new(sessions, settings)).await
}
