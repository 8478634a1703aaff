use anyhow::Result;
use sea_orm::Database;

use crate::schemas::AppState;

/// Build the application state handed to the router. All configuration
/// enters through here; nothing below this reads the environment.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    Ok(AppState { db })
}
