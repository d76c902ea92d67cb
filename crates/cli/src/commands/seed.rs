//! Demo catalog seeding.

use tracing::info;

use roomservice_server::db::{self, PgStore, seed::seed_demo_catalog};

use super::{CommandError, database_url};

/// Create the demo restaurant, categories and menu items.
///
/// Does nothing when a restaurant already exists.
///
/// # Errors
///
/// Returns an error if the database URL is missing or a write fails.
pub async fn demo_catalog() -> Result<(), CommandError> {
    let database_url = database_url()?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let store = PgStore::new(pool);
    let restaurant = seed_demo_catalog(&store).await?;

    info!(id = %restaurant.id, name = %restaurant.name, "Demo catalog ready");
    Ok(())
}
