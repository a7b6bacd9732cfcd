//! Data Discord commands - `export` and `import`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, signed_in_session, with_notifications},
        core::transfer::ExportFormat,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::warn;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum FormatChoice {
        #[name = "JSON (can be imported back)"]
        Json,
        #[name = "CSV (spreadsheet)"]
        Csv,
    }

    impl From<FormatChoice> for ExportFormat {
        fn from(choice: FormatChoice) -> Self {
            match choice {
                FormatChoice::Json => Self::Json,
                FormatChoice::Csv => Self::Csv,
            }
        }
    }

    /// Downloads your data as a JSON or CSV file.
    #[poise::command(slash_command)]
    pub async fn export(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "File format"] format: FormatChoice,
    ) -> Result<()> {
        let shared = signed_in_session(ctx).await?;
        let now = chrono::Local::now().naive_local();
        let file = shared.lock().await.export(format.into(), now)?;

        let attachment = serenity::CreateAttachment::bytes(file.content.into_bytes(), file.filename);
        ctx.send(
            poise::CreateReply::default()
                .content("📦 Here is your data.")
                .attachment(attachment)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Replaces all your data with the contents of a JSON export.
    #[poise::command(slash_command)]
    pub async fn import(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "A JSON file created by /export"] file: serenity::Attachment,
    ) -> Result<()> {
        let shared = signed_in_session(ctx).await?;
        ctx.defer_ephemeral().await?;

        let bytes = file.download().await?;
        let Ok(text) = String::from_utf8(bytes) else {
            return Err(Error::InvalidImport {
                message: "file is not UTF-8 text".to_string(),
            });
        };

        let outcome = shared.lock().await.import(&text).await;
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Rejected import of {}: {e}", file.filename);
                return Err(e);
            }
        };

        let message = format!("📥 Finished importing `{}`.", file.filename);
        ctx.say(with_notifications(message, &outcome.notifications))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
