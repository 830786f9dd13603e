use household_ledger::{
    config::{database, settings},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = settings::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the store and make sure the schema exists
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to open database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    let counts = database::count_rows(&db).await?;
    info!(
        users = counts.users,
        members = counts.members,
        expenses = counts.expenses,
        "Ledger store ready at {}",
        app_config.database_url
    );

    db.close().await?;
    Ok(())
}
