//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

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
        let help_text = "**ClaimsBuddy Help**\n\
        Here is a summary of all available commands for ClaimsBuddy.\n\n\
        **Claims**\n\
        • `/submit_claim <category> <amount> <description> [mileage] [start] [end] [receipt]` - Submits an expense claim.\n\
        • `/claims [status]` - Lists your claims (admins see everyone's).\n\
        • `/claim <id>` - Shows one claim in detail.\n\
        • `/dashboard [view]` - Status counters and recent claims, or the report view.\n\n\
        **Review (admins)**\n\
        • `/approve <id>` / `/deny <id>` - Reviews a pending claim.\n\n\
        **Reports (admins)**\n\
        • `/report [employee]` - Totals per category for the last six months.\n\
        • `/report_csv [employee]` - Downloads the report as CSV.\n\
        • `/save_report [employee]` - Saves a CSV snapshot.\n\
        • `/saved_reports` - Lists saved snapshots.\n\
        • `/download_report <name>` - Downloads a saved snapshot.\n\n\
        **Administration**\n\
        • `/categories` - Lists expense categories.\n\
        • `/add_category <name> [requires_mileage]` - Adds a category (admins).\n\
        • `/profiles` - Lists profiles and roles (admins).\n\
        • `/edit_profile [first_name] [last_name] [email]` - Updates your profile.\n\
        • `/set_role <user> <role>` - Changes a role (super admins).\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
