//! People Discord commands - `people` management and `owe`.
//!
//! People are addressed by name in commands; names are resolved to ids through the
//! session's data.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, signed_in_session, with_notifications},
        core::{person, report},
        errors::{Error, Result},
        models::DebtDirection,
        state::AppState,
    };
    use poise::serenity_prelude as serenity;

    /// Which way the money goes.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum DirectionChoice {
        #[name = "They owe me"]
        TheyOwe,
        #[name = "I owe them"]
        YouOwe,
    }

    impl From<DirectionChoice> for DebtDirection {
        fn from(choice: DirectionChoice) -> Self {
            match choice {
                DirectionChoice::TheyOwe => Self::TheyOwe,
                DirectionChoice::YouOwe => Self::YouOwe,
            }
        }
    }

    /// Id of the person called `name`.
    pub(crate) fn resolve_person(state: &AppState, name: &str) -> Result<String> {
        state
            .find_person_by_name(name)
            .map(|person| person.id.clone())
            .ok_or_else(|| Error::PersonNotFound {
                id: name.to_string(),
            })
    }

    /// Parent command for managing the people you lend to and borrow from.
    #[poise::command(
        slash_command,
        subcommands("people_add", "people_rename", "people_remove", "people_list")
    )]
    pub async fn people(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "People management command. Available subcommands:\n\
            `/people add` - Add a person\n\
            `/people rename` - Rename a person\n\
            `/people remove` - Remove a person\n\
            `/people list` - List people with their balances";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a person.
    #[poise::command(slash_command, rename = "add")]
    pub async fn people_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the person"] name: String,
    ) -> Result<()> {
        let shared = signed_in_session(ctx).await?;
        let outcome = shared
            .lock()
            .await
            .execute(|state| person::add_person(state, &name))
            .await?;

        let message = format!("✅ Added **{}**.", outcome.value.name);
        ctx.say(with_notifications(message, &outcome.notifications))
            .await?;
        Ok(())
    }

    /// Renames a person.
    #[poise::command(slash_command, rename = "rename")]
    pub async fn people_rename(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Current name"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: String,
        #[description = "New name"] new_name: String,
    ) -> Result<()> {
        let shared = signed_in_session(ctx).await?;
        let outcome = shared
            .lock()
            .await
            .execute(|state| {
                let id = resolve_person(state, &person)?;
                person::rename_person(state, &id, &new_name)
            })
            .await?;

        let message = format!("✏️ Renamed **{person}** to **{}**.", outcome.value.name);
        ctx.say(with_notifications(message, &outcome.notifications))
            .await?;
        Ok(())
    }

    /// Removes a person; with `confirm`, also removes their debts.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn people_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Person to remove"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: String,
        #[description = "Also remove all of their debts"] confirm: Option<bool>,
    ) -> Result<()> {
        let confirmed = confirm.unwrap_or(false);
        let shared = signed_in_session(ctx).await?;
        let outcome = shared
            .lock()
            .await
            .execute(|state| {
                let id = resolve_person(state, &person)?;
                if confirmed {
                    person::confirm_remove_person(state, &id)
                } else {
                    person::remove_person(state, &id).map(|removed| (removed, 0))
                }
            })
            .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(Error::PersonHasDebts { name, count }) => {
                ctx.say(format!(
                    "⚠️ **{name}** still has {count} debt(s). Run `/people remove person:{name} confirm:True` to remove them together with all their debts."
                ))
                .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let (removed, debt_count) = outcome.value;
        let message = if debt_count > 0 {
            format!(
                "🗑️ Removed **{}** and {debt_count} debt(s).",
                removed.name
            )
        } else {
            format!("🗑️ Removed **{}**.", removed.name)
        };
        ctx.say(with_notifications(message, &outcome.notifications))
            .await?;
        Ok(())
    }

    /// Lists people with their debt summaries.
    #[poise::command(slash_command, rename = "list")]
    pub async fn people_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let shared = signed_in_session(ctx).await?;
        let currency = ctx.data().currency();

        let fields: Vec<(String, String, bool)> = {
            let session = shared.lock().await;
            person::summarize_people(session.state())
                .into_iter()
                .map(|(person, summary)| {
                    (
                        person.name.clone(),
                        report::format_person_summary(&summary, currency),
                        false,
                    )
                })
                .collect()
        };

        if fields.is_empty() {
            ctx.say("👥 No people yet. Add one with `/people add`.")
                .await?;
            return Ok(());
        }

        let count = fields.len();
        // Discord allows at most 25 fields per embed
        let embed = serenity::CreateEmbed::default()
            .title("👥 People")
            .color(0x0034_98DB)
            .fields(fields.into_iter().take(25))
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{count} {}",
                if count == 1 { "person" } else { "people" }
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Starts a debt for a person; finish it with `/debt add`.
    #[poise::command(slash_command)]
    pub async fn owe(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Person"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: String,
        #[description = "Which way the money goes"] direction: DirectionChoice,
    ) -> Result<()> {
        let shared = signed_in_session(ctx).await?;
        let is_borrowed = DebtDirection::from(direction) == DebtDirection::YouOwe;
        let name = {
            let mut session = shared.lock().await;
            let (id, name) = session
                .state()
                .find_person_by_name(&person)
                .map(|found| (found.id.clone(), found.name.clone()))
                .ok_or_else(|| Error::PersonNotFound { id: person.clone() })?;
            session.request_debt_for(id, is_borrowed);
            name
        };

        ctx.say(format!(
            "📝 New debt with **{name}** ({}). Finish it with `/debt add amount:<amount>`.",
            report::direction_label(direction.into())
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
