pub mod config;
pub mod entities;
pub mod extract;
pub mod middleware;
pub mod pricing;
pub mod routes;
pub mod services;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::entities::{primary_settup, setup_schema};

pub use crate::routes::api_router;

/// Connects, creates the schema and seeds the default accounts.
pub async fn connect(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    setup_schema(&db).await?;
    primary_settup(&db, &config.seed_password).await?;
    Ok(db)
}

pub fn create_app(db: DatabaseConnection, config: AppConfig) -> axum::Router {
    api_router(Arc::new(db), Arc::new(config))
}
