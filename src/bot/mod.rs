//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the ClaimsBuddy application,
//! including all slash commands, autocomplete handlers, and bot context management.
//! The Discord user id of the command author is the identity every core
//! operation is performed as.

/// Discord command implementations (claims, reports, administration, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::{ClaimPolicy, ReportSettings},
    core::{profile, snapshot::FsObjectStore},
    entities::profile::Model as ProfileModel,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the policy switches from
/// config.toml and the snapshot store.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Review workflow policy
    pub policy: ClaimPolicy,
    /// Report ordering and storage settings
    pub reports: ReportSettings,
    /// Object store holding report snapshots
    pub store: FsObjectStore,
}

impl BotData {
    /// Creates a new `BotData` instance.
    /// This is typically called during bot initialization to set up the
    /// shared context for all commands.
    #[must_use]
    pub const fn new(
        database: DatabaseConnection,
        policy: ClaimPolicy,
        reports: ReportSettings,
        store: FsObjectStore,
    ) -> Self {
        Self {
            database,
            policy,
            reports,
            store,
        }
    }
}

/// Loads the command author's profile, creating an employee profile on first use.
pub async fn author_profile(ctx: poise::Context<'_, BotData, Error>) -> Result<ProfileModel> {
    let author = ctx.author();
    let first_name = author.global_name.as_deref().unwrap_or(&author.name);
    profile::ensure_profile(&ctx.data().database, &author.id.to_string(), first_name).await
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.is_user_facing() {
                warn!("Command `{}` rejected: {error}", ctx.command().name);
            } else {
                error!("Error in command `{}`: {error:?}", ctx.command().name);
            }
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
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

/// Builds the poise framework, registers all commands globally and runs the
/// client until it disconnects.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}
