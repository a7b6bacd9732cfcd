//! Account Discord commands - `signin` and `signout`.
//!
//! Signing in opens the caller's session, makes sure their remote document exists and
//! starts mirroring it. The Discord account is the identity.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
        persistence::UserIdentity,
        session,
    };
    use tracing::warn;

    /// Signs in with your Discord account and starts syncing your data.
    #[poise::command(slash_command)]
    pub async fn signin(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let author = ctx.author();
        let identity = UserIdentity {
            uid: author.id.to_string(),
            display_name: author.global_name.clone().unwrap_or_else(|| author.name.clone()),
        };
        let display_name = identity.display_name.clone();

        let shared = ctx.data().sessions.open(&identity.uid).await?;
        if shared.lock().await.is_signed_in() {
            ctx.say(format!("ℹ️ Already signed in as {display_name}."))
                .await?;
            return Ok(());
        }

        match session::sign_in(&shared, identity).await {
            Ok(()) => {
                ctx.say(format!(
                    "✅ Signed in as **{display_name}**. Your data now syncs across devices."
                ))
                .await?;
            }
            Err(e) => {
                warn!("Sign-in failed for {display_name}: {e}");
                ctx.say(format!("❌ Failed to sign in: {e}")).await?;
            }
        }
        Ok(())
    }

    /// Signs out. Your data stays available locally.
    #[poise::command(slash_command)]
    pub async fn signout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let profile = ctx.author().id.to_string();
        let shared = ctx.data().sessions.open(&profile).await?;
        let Some(identity) = session::sign_out(&shared).await? else {
            return Err(Error::NotSignedIn);
        };
        ctx.say(format!(
            "👋 Signed out {}. Changes are now kept locally only.",
            identity.display_name
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
