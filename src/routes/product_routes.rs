use axum::{
    extract::{Extension, Query},
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
use crate::services::catalog::{self, PatchProduct, ProductInput, ProductsQuery, ReviewInput};

//ROUTERS
pub fn product_routes() -> Router {
    Router::new()
        .route("/product", get(get_products))
        .route("/product/:id", get(get_product))
        .route("/product/:id/review", get(get_reviews))
}

pub fn review_routes() -> Router {
    Router::new().route("/review", post(create_review))
}

pub fn admin_product_routes() -> Router {
    Router::new()
        .route("/product", post(create_product))
        .route("/product/:id", patch(patch_product).delete(delete_product))
}

//ROUTES
async fn get_products(
    Query(params): Query<ProductsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::list_products(&db, params).await {
        Ok(products) => to_response(Json(products), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_product(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::get_product(&db, id).await {
        Ok(product) => to_response(Json(product), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_reviews(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::list_reviews(&db, id).await {
        Ok(reviews) => to_response(Json(reviews), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn create_review(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<ReviewInput>,
) -> Response {
    match catalog::create_review(&db, &claims, payload).await {
        Ok(review) => to_response((StatusCode::CREATED, Json(review)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidJson(payload): ValidJson<ProductInput>,
) -> Response {
    match catalog::create_product(&db, payload).await {
        Ok(product) => to_response((StatusCode::CREATED, Json(product)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn patch_product(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidJson(payload): ValidJson<PatchProduct>,
) -> Response {
    match catalog::update_product(&db, id, payload).await {
        Ok(product) => to_response(Json(product), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn delete_product(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::delete_product(&db, id).await {
        Ok(()) => deleted(),
        Err(err) => err.into_response(),
    }
}
