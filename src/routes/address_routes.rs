use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::deleted;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::{auth::Claims, logging::to_response};
use crate::services::address::{self, AddressInput};

pub fn address_routes() -> Router {
    Router::new()
        .route("/address", get(get_addresses).post(create_address))
        .route("/address/:id", delete(delete_address))
}

async fn get_addresses(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match address::list_addresses(&db, &claims).await {
        Ok(addresses) => to_response(Json(addresses), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn create_address(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<AddressInput>,
) -> Response {
    match address::create_address(&db, &claims, payload).await {
        Ok(address) => to_response((StatusCode::CREATED, Json(address)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn delete_address(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match address::delete_address(&db, &claims, id).await {
        Ok(()) => deleted(),
        Err(err) => err.into_response(),
    }
}
