use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::deleted;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::{auth::Claims, logging::to_response};
use crate::services::order::{self, CreateOrder, UpdateOrder};

//ROUTERS
pub fn order_routes() -> Router {
    Router::new()
        .route("/cart/:id/order", post(create_order))
        .route("/order", get(get_orders))
        .route("/order/:id", get(get_order).delete(delete_order))
}

pub fn admin_order_routes() -> Router {
    Router::new().route("/order/:id", patch(patch_order))
}

//Routes
async fn create_order(
    ValidPath(cart_id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<CreateOrder>,
) -> Response {
    match order::create_order(&db, &claims, cart_id, payload).await {
        Ok(order) => to_response((StatusCode::CREATED, Json(order)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match order::list_orders(&db, &claims).await {
        Ok(orders) => to_response(Json(orders), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_order(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match order::get_order(&db, &claims, id).await {
        Ok(order) => to_response(Json(order), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn delete_order(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match order::delete_order(&db, &claims, id).await {
        Ok(()) => deleted(),
        Err(err) => err.into_response(),
    }
}

async fn patch_order(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<UpdateOrder>,
) -> Response {
    match order::update_order(&db, &claims, id, payload).await {
        Ok(order) => to_response(Json(order), Ok(())),
        Err(err) => err.into_response(),
    }
}
