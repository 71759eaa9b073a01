use claims_buddy::{
    bot::{self, BotData},
    config::{database, settings},
    core::{category, profile, snapshot::FsObjectStore},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();

    // 3. Load config.toml
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed categories and bootstrap profiles
    let seeded = category::seed_categories(&db, &app_config.categories).await?;
    info!("Seeded {seeded} new categories");
    let written = profile::seed_profiles(&db, &app_config.profiles).await?;
    info!("Wrote {written} bootstrap profiles");

    let store = FsObjectStore::new(app_config.reports.storage_root.clone());
    info!("Report snapshots stored under {}", store.root().display());

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    let data = BotData::new(db, app_config.claims, app_config.reports, store);
    bot::run_bot(token, data).await
}
