//! General Discord commands - ping and help.
//! These commands need no session and work before signing in.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Debt Tracker Help**\n\
        Keep track of money you lent and borrowed.\n\n\
        **Account**\n\
        • `/signin` - Sign in; your data then syncs everywhere you use the bot.\n\
        • `/signout` - Stop syncing. Your data stays on this device.\n\n\
        **People**\n\
        • `/people add|rename|remove|list` - Manage the people you deal with.\n\
        • `/owe <person> <direction>` - Start a debt for someone; finish it with `/debt add`.\n\n\
        **Debts**\n\
        • `/debt add|edit|remove|toggle|clear_settled` - Manage debts.\n\
        • `/debts [filters] [sort]` - List debts.\n\
        • `/stats` - Totals, net balance and overdue count.\n\n\
        **Data**\n\
        • `/export <json|csv>` - Download your data.\n\
        • `/import <file>` - Replace your data with a JSON export.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
