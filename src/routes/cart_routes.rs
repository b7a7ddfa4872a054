use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::deleted;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::{auth::Claims, logging::to_response};
use crate::services::cart::{self, AddCartItem, UpdateCartItem};

//ROUTERS
pub fn cart_routes() -> Router {
    Router::new()
        .route("/cart", get(get_carts).post(create_cart))
        .route("/cart/:id", get(get_cart).delete(delete_cart))
        .route("/cart/:id/items", get(get_items).post(add_item))
        .route(
            "/cart/:id/items/:item_id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

//Routes
async fn get_carts(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::list_carts(&db, &claims).await {
        Ok(carts) => to_response(Json(carts), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn create_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::create_cart(&db, &claims).await {
        Ok(cart) => to_response((StatusCode::CREATED, Json(cart)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_cart(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::get_cart(&db, &claims, id).await {
        Ok(cart) => to_response(Json(cart), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn delete_cart(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::delete_cart(&db, &claims, id).await {
        Ok(()) => deleted(),
        Err(err) => err.into_response(),
    }
}

async fn get_items(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::list_items(&db, &claims, id).await {
        Ok(items) => to_response(Json(items), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn add_item(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<AddCartItem>,
) -> Response {
    match cart::add_item(&db, &claims, id, payload).await {
        // A product already in the cart only has its quantity bumped.
        Ok((item, true)) => to_response((StatusCode::CREATED, Json(item)), Ok(())),
        Ok((item, false)) => to_response((StatusCode::OK, Json(item)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_item(
    ValidPath((id, item_id)): ValidPath<(i32, i32)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::get_item(&db, &claims, id, item_id).await {
        Ok(item) => to_response(Json(item), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn update_item(
    ValidPath((id, item_id)): ValidPath<(i32, i32)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<UpdateCartItem>,
) -> Response {
    match cart::update_item(&db, &claims, id, item_id, payload).await {
        Ok(item) => to_response(Json(item), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn delete_item(
    ValidPath((id, item_id)): ValidPath<(i32, i32)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match cart::delete_item(&db, &claims, id, item_id).await {
        Ok(()) => deleted(),
        Err(err) => err.into_response(),
    }
}
