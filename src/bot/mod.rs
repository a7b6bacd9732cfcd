//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the debt tracker, including all
//! slash commands, autocomplete handlers, and bot context management. The Discord
//! account running a command is the identity: its id keys both the local profile and
//! the remote document.

/// Discord command implementations (account, people, debts, data, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::Settings,
    errors::{Error, Result},
    persistence::Notification,
    session::{SessionRegistry, SharedSession},
};
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Open per-user sessions
    pub sessions: SessionRegistry,
    /// Application settings
    pub settings: Settings,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(sessions: SessionRegistry, settings: Settings) -> Self {
        Self { sessions, settings }
    }

    /// Currency code used when formatting amounts.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.settings.display.currency
    }
}

/// Today's date on the local clock.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parses an optional `YYYY-MM-DD` command argument.
pub fn parse_date_option(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Error::InvalidDate {
                value: value.to_string(),
            })
        })
        .transpose()
}

/// Session of the invoking user. Fails with [`Error::NotSignedIn`] unless the user
/// has signed in, now or before the bot last restarted.
pub async fn signed_in_session(ctx: poise::Context<'_, BotData, Error>) -> Result<SharedSession> {
    let profile = ctx.author().id.to_string();
    let session = ctx.data().sessions.open(&profile).await?;
    if !session.lock().await.is_signed_in() {
        return Err(Error::NotSignedIn);
    }
    Ok(session)
}

/// Appends notification lines to a reply.
#[must_use]
pub fn with_notifications(message: String, notifications: &[Notification]) -> String {
    notifications.iter().fold(message, |mut text, note| {
        text.push('\n');
        text.push_str(&note.to_string());
        text
    })
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let message = if error.is_user_facing() {
                warn!("Command `{}` rejected: {error}", ctx.command().name);
                format!("❌ {error}")
            } else {
                error!("Error in command `{}`: {error:?}", ctx.command().name);
                format!("An error occurred: {error}")
            };
            if let Err(e) = ctx.say(message).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Every top-level slash command.
#[must_use]
pub fn command_list() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::signin(),
        commands::signout(),
        commands::people(),
        commands::owe(),
        commands::debt(),
        commands::debts(),
        commands::stats(),
        commands::export(),
        commands::import(),
    ]
}

/// Builds the framework, connects to Discord and runs until the client stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: command_list(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
