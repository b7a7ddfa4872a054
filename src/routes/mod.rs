pub mod address_routes;
pub mod auth_routes;
pub mod cart_routes;
pub mod category_routes;
pub mod coupon_routes;
pub mod order_routes;
pub mod product_routes;

use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::Response,
    routing::get,
    Extension, Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::entities::user::Role;
use crate::middleware::{
    auth::{auth_middleware, AuthState},
    logging::{logging_middleware, to_response},
};

use {
    address_routes::address_routes,
    auth_routes::auth_routes,
    cart_routes::cart_routes,
    category_routes::category_routes,
    coupon_routes::admin_coupon_routes,
    order_routes::{admin_order_routes, order_routes},
    product_routes::{admin_product_routes, product_routes, review_routes},
};

pub fn api_router(db: Arc<DatabaseConnection>, config: Arc<AppConfig>) -> Router {
    let auth_state = |role| AuthState {
        db: db.clone(),
        config: config.clone(),
        role,
    };

    let public_routes = Router::new()
        .merge(product_routes())
        .merge(category_routes());

    let user_routes = Router::new()
        .merge(cart_routes())
        .merge(order_routes())
        .merge(address_routes())
        .merge(review_routes())
        .layer(from_fn_with_state(auth_state(Role::User), auth_middleware));

    let admin_routes = Router::new()
        .merge(admin_coupon_routes())
        .merge(admin_order_routes())
        .merge(admin_product_routes())
        .layer(from_fn_with_state(auth_state(Role::Admin), auth_middleware));

    Router::new()
        .route("/", get(health))
        .merge(auth_routes())
        .nest("/api", public_routes.merge(user_routes))
        .nest("/api/admin", admin_routes)
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(db))
        .layer(Extension(config))
}

async fn health() -> Response {
    to_response(Json(json!({ "status": "ok" })), Ok(()))
}

pub(crate) fn deleted() -> Response {
    to_response(
        (
            StatusCode::OK,
            Json(json!({
                "message": "Resource deleted successfully"
            })),
        ),
        Ok(()),
    )
}
