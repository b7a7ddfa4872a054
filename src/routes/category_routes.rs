use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::logging::to_response;
use crate::services::catalog;

pub fn category_routes() -> Router {
    Router::new().route("/category", get(get_categories))
}

async fn get_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match catalog::list_categories(&db).await {
        Ok(categories) => to_response(Json(categories), Ok(())),
        Err(err) => err.into_response(),
    }
}
