use sdg_assessment::{
    api::{self, AppState},
    config::{database, settings},
    core::goal::{GoalCatalog, seed_goals},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file (non-fatal, env vars can be set externally)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // 2. Load the application configuration; its log filter applies unless RUST_LOG is set
    let app_config = settings::load_app_configuration()?;

    // 3. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.log_filter)),
        )
        .init();
    if dotenv_loaded {
        info!("Loaded .env file");
    }
    info!(
        database_url = %app_config.database_url,
        bind_address = %app_config.bind_address,
        "Configuration loaded"
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready"))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the goal reference table and load it once for all requests
    seed_goals(&db).await?;
    let goals = GoalCatalog::load(&db)
        .await
        .inspect_err(|e| error!("Goal reference data incomplete: {}", e))?;

    // 6. Serve
    api::serve(AppState::new(db, goals), &app_config.bind_address).await
}
