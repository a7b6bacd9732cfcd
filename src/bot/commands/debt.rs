//! Debt Discord commands - `debt` management, `debts` listing and `stats`.
//!
//! Debts are picked through autocomplete, which shows a description line and passes
//! the debt id to the command.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::people::{DirectionChoice, resolve_person},
            handlers::autocomplete,
            parse_date_option, signed_in_session, today, with_notifications,
        },
        core::{
            debt::{self, DebtDraft},
            query::{DebtFilter, DebtSort, SortDirection, SortField},
            report,
        },
        errors::{Error, Result},
        models::{DebtDirection, DebtStatus},
    };
    use poise::serenity_prelude as serenity;

    /// Most debts shown by one `/debts` reply
    const MAX_LISTED: usize = 20;
    /// Longest single line in the `/debts` listing
    const MAX_LINE_CHARS: usize = 300;
    /// Discord limit on an embed description
    const MAX_DESCRIPTION_CHARS: usize = 4096;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        #[name = "Given"]
        Given,
        #[name = "Paid back"]
        PayedBack,
        #[name = "Borrowed"]
        Borrowed,
        #[name = "Returned"]
        Returned,
    }

    impl From<StatusChoice> for DebtStatus {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::Given => Self::Given,
                StatusChoice::PayedBack => Self::PayedBack,
                StatusChoice::Borrowed => Self::Borrowed,
                StatusChoice::Returned => Self::Returned,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum SortChoice {
        #[name = "Date"]
        Date,
        #[name = "Due date"]
        DueDate,
        #[name = "Amount"]
        Amount,
        #[name = "Person"]
        PersonName,
        #[name = "Status"]
        Status,
    }

    impl From<SortChoice> for SortField {
        fn from(choice: SortChoice) -> Self {
            match choice {
                SortChoice::Date => Self::Date,
                SortChoice::DueDate => Self::DueDate,
                SortChoice::Amount => Self::Amount,
                SortChoice::PersonName => Self::PersonName,
                SortChoice::Status => Self::Status,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum OrderChoice {
        #[name = "Ascending"]
        Asc,
        #[name = "Descending"]
        Desc,
    }

    impl From<OrderChoice> for SortDirection {
        fn from(choice: OrderChoice) -> Self {
            match choice {
                OrderChoice::Asc => Self::Asc,
                OrderChoice::Desc => Self::Desc,
            }
        }
    }

    /// Parent command for managing debts.
    #[poise::command(
        slash_command,
        subcommands(
            "debt_add",
            "debt_edit",
            "debt_remove",
            "debt_toggle",
            "debt_clear_settled"
        )
    )]
    pub async fn debt(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Debt management command. Available subcommands:\n\
            `/debt add` - Record a new debt\n\
            `/debt edit` - Change a debt\n\
            `/debt remove` - Delete a debt\n\
            `/debt toggle` - Mark a debt settled, or open again\n\
            `/debt clear_settled` - Delete every settled debt";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records a new debt. Without a person, completes the debt started with `/owe`.
    #[poise::command(slash_command, rename = "add")]
    pub async fn debt_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount of money"] amount: f64,
        #[description = "Person (defaults to the one picked with /owe)"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: Option<String>,
        #[description = "Which way the money went"] direction: Option<DirectionChoice>,
        #[description = "What it was for"] description: Option<String>,
        #[description = "Date the money changed hands (YYYY-MM-DD, default today)"] date: Option<
            String,
        >,
        #[description = "Expected return date (YYYY-MM-DD)"] due: Option<String>,
    ) -> Result<()> {
        let today = today();
        let date = parse_date_option(date.as_deref())?;
        let due = parse_date_option(due.as_deref())?;
        let currency = ctx.data().currency();
        let shared = signed_in_session(ctx).await?;

        let reply = {
            let mut session = shared.lock().await;
            let base = match &person {
                Some(name) => Some(DebtDraft::for_person(
                    resolve_person(session.state(), name)?,
                    false,
                    today,
                )),
                None => session
                    .take_pending_intent()
                    .map(|intent| DebtDraft::from_intent(intent, today)),
            };

            match base {
                None => None,
                Some(mut draft) => {
                    draft.amount = amount;
                    if let Some(direction) = direction {
                        draft.direction = direction.into();
                    }
                    draft.description = description.unwrap_or_default();
                    draft.date = date.unwrap_or(today);
                    draft.expected_return_date = due;

                    let outcome = session
                        .execute(|state| debt::add_debt(state, draft))
                        .await?;
                    let line =
                        report::format_debt_line(session.state(), &outcome.value, currency, today);
                    Some(with_notifications(
                        format!("✅ Recorded: {line}"),
                        &outcome.notifications,
                    ))
                }
            }
        };

        let message =
            reply.unwrap_or_else(|| "❓ Choose a person, or start with `/owe`.".to_string());
        ctx.say(message).await?;
        Ok(())
    }

    /// Changes a debt. Only the given fields change.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "edit")]
    pub async fn debt_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Debt to change"]
        #[autocomplete = "autocomplete::autocomplete_debt"]
        debt: String,
        #[description = "New amount"] amount: Option<f64>,
        #[description = "New person"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: Option<String>,
        #[description = "New direction"] direction: Option<DirectionChoice>,
        #[description = "New status"] status: Option<StatusChoice>,
        #[description = "New description"] description: Option<String>,
        #[description = "New date (YYYY-MM-DD)"] date: Option<String>,
        #[description = "New expected return date (YYYY-MM-DD)"] due: Option<String>,
        #[description = "Remove the expected return date"] clear_due: Option<bool>,
    ) -> Result<()> {
        let today = today();
        let date = parse_date_option(date.as_deref())?;
        let due = parse_date_option(due.as_deref())?;
        let currency = ctx.data().currency();
        let shared = signed_in_session(ctx).await?;

        let message = {
            let mut session = shared.lock().await;
            let outcome = session
                .execute(|state| {
                    let existing = state
                        .find_debt(&debt)
                        .ok_or_else(|| Error::DebtNotFound { id: debt.clone() })?;
                    let mut draft = DebtDraft::from_debt(existing);

                    if let Some(amount) = amount {
                        draft.amount = amount;
                    }
                    if let Some(name) = &person {
                        draft.person_id = resolve_person(state, name)?;
                    }
                    if let Some(status) = status {
                        let status = DebtStatus::from(status);
                        draft.direction = status.direction();
                        draft.status = Some(status);
                    }
                    if let Some(direction) = direction {
                        draft.direction = DebtDirection::from(direction);
                    }
                    if let Some(description) = description {
                        draft.description = description;
                    }
                    if let Some(date) = date {
                        draft.date = date;
                    }
                    if clear_due.unwrap_or(false) {
                        draft.expected_return_date = None;
                    } else if due.is_some() {
                        draft.expected_return_date = due;
                    }

                    debt::update_debt(state, &debt, draft)
                })
                .await?;
            let line = report::format_debt_line(session.state(), &outcome.value, currency, today);
            with_notifications(format!("✏️ Updated: {line}"), &outcome.notifications)
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Deletes a debt.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn debt_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Debt to delete"]
        #[autocomplete = "autocomplete::autocomplete_debt"]
        debt: String,
    ) -> Result<()> {
        let currency = ctx.data().currency();
        let shared = signed_in_session(ctx).await?;

        let message = {
            let mut session = shared.lock().await;
            let outcome = session
                .execute(|state| debt::remove_debt(state, &debt))
                .await?;
            let line = report::format_debt_line(session.state(), &outcome.value, currency, today());
            with_notifications(format!("🗑️ Deleted: {line}"), &outcome.notifications)
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Marks a debt settled, or outstanding again.
    #[poise::command(slash_command, rename = "toggle")]
    pub async fn debt_toggle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Debt to toggle"]
        #[autocomplete = "autocomplete::autocomplete_debt"]
        debt: String,
    ) -> Result<()> {
        let shared = signed_in_session(ctx).await?;

        let message = {
            let mut session = shared.lock().await;
            let outcome = session
                .execute(|state| debt::toggle_debt_status(state, &debt))
                .await?;
            let toggled = &outcome.value;
            let name = session.state().person_label(&toggled.person_id).to_string();
            with_notifications(
                format!(
                    "🔁 Debt with **{name}** is now **{}**.",
                    report::status_label(toggled.status)
                ),
                &outcome.notifications,
            )
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Deletes every paid back or returned debt.
    #[poise::command(slash_command, rename = "clear_settled")]
    pub async fn debt_clear_settled(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let shared = signed_in_session(ctx).await?;
        let outcome = shared
            .lock()
            .await
            .execute(|state| Ok(debt::remove_settled_debts(state)))
            .await?;

        let message = if outcome.value == 0 {
            "ℹ️ No settled debts to remove.".to_string()
        } else {
            format!("🧹 Removed {} settled debt(s).", outcome.value)
        };
        ctx.say(with_notifications(message, &outcome.notifications))
            .await?;
        Ok(())
    }

    /// Lists debts, optionally filtered and sorted (newest first by default).
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command)]
    pub async fn debts(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only debts with this person"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: Option<String>,
        #[description = "Only debts with this status"] status: Option<StatusChoice>,
        #[description = "Only debts in this direction"] direction: Option<DirectionChoice>,
        #[description = "Only overdue debts"] overdue: Option<bool>,
        #[description = "Minimum amount"] min_amount: Option<f64>,
        #[description = "Maximum amount"] max_amount: Option<f64>,
        #[description = "From date (YYYY-MM-DD)"] from: Option<String>,
        #[description = "To date (YYYY-MM-DD)"] to: Option<String>,
        #[description = "Sort by"] sort: Option<SortChoice>,
        #[description = "Sort order"] order: Option<OrderChoice>,
    ) -> Result<()> {
        let today = today();
        let currency = ctx.data().currency();
        let shared = signed_in_session(ctx).await?;
        let mut session = shared.lock().await;

        let filter = DebtFilter {
            person_id: person
                .as_deref()
                .map(|name| resolve_person(session.state(), name))
                .transpose()?,
            status: status.map(Into::into),
            direction: direction.map(Into::into),
            overdue: overdue.unwrap_or(false),
            min_amount,
            max_amount,
            date_from: parse_date_option(from.as_deref())?,
            date_to: parse_date_option(to.as_deref())?,
        };
        let defaults = DebtSort::default();
        let sort = DebtSort::new(
            sort.map_or(defaults.field, Into::into),
            order.map_or(defaults.direction, Into::into),
        );

        let total = session.state().debts().len();
        let view = session.view(&filter, sort, today).clone();
        let listing: Vec<String> = view
            .debts
            .iter()
            .take(MAX_LISTED)
            .map(|debt| {
                let line = report::format_debt_line(session.state(), debt, currency, today);
                report::truncate_chars(&format!("• {line}"), MAX_LINE_CHARS)
            })
            .collect();
        drop(session);

        if view.debts.is_empty() {
            let message = if filter.has_active_filters() {
                "🔍 No debts match these filters."
            } else {
                "📒 No debts yet. Record one with `/debt add`."
            };
            ctx.say(message).await?;
            return Ok(());
        }

        let (description, shown) = report::join_lines_within(&listing, MAX_DESCRIPTION_CHARS);
        let mut footer = format!("Showing {shown} of {total} debt(s)");
        if shown < view.debts.len() {
            footer.push_str(&format!(" · {} more not listed", view.debts.len() - shown));
        }
        if filter.has_active_filters() {
            footer.push_str(" · filters active");
        }
        let embed = serenity::CreateEmbed::default()
            .title("📒 Debts")
            .description(description)
            .color(0x0034_98DB)
            .footer(serenity::CreateEmbedFooter::new(footer));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows totals, net balance and the number of overdue debts.
    #[poise::command(slash_command)]
    pub async fn stats(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let currency = ctx.data().currency();
        let shared = signed_in_session(ctx).await?;
        let stats = shared
            .lock()
            .await
            .view(&DebtFilter::default(), DebtSort::default(), today())
            .stats
            .clone();

        let embed = serenity::CreateEmbed::default()
            .title("📊 Debt Statistics")
            .description(report::format_stats(&stats, currency))
            .color(if stats.net_balance < 0.0 {
                0x00E7_4C3C
            } else {
                0x0027_AE60
            });

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
