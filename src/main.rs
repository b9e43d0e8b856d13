use menu_buddy::{
    bot,
    config::{database, settings, users},
    core::{group, user},
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

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load config.toml
    let settings = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    info!(
        "Settings loaded: stock policy {:?}, VAT {}",
        settings.stock_policy, settings.vat_rate
    );

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Seed groups and admins
    let seeded = group::seed_groups(&db, &settings.groups).await?;
    info!("Seeded {seeded} groups from config.");
    for discord_id in users::get_admin_discord_ids() {
        let admin = user::ensure_admin(&db, &discord_id).await?;
        info!("Admin {} bound to Discord account {discord_id}", admin.id);
    }

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, db, settings).await
}
