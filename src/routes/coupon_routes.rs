use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::extract::{ValidJson, ValidPath};
use crate::middleware::logging::to_response;
use crate::services::coupon::{self, CouponInput};

//ROUTERS
pub fn admin_coupon_routes() -> Router {
    Router::new()
        .route("/coupon", get(get_coupons).post(create_coupon))
        .route("/coupon/:id", get(get_coupon).put(update_coupon))
}

//Routes
async fn get_coupons(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match coupon::list_coupons(&db).await {
        Ok(coupons) => to_response(Json(coupons), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn create_coupon(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidJson(payload): ValidJson<CouponInput>,
) -> Response {
    match coupon::create_coupon(&db, payload).await {
        Ok(coupon) => to_response((StatusCode::CREATED, Json(coupon)), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn get_coupon(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match coupon::get_coupon(&db, id).await {
        Ok(coupon) => to_response(Json(coupon), Ok(())),
        Err(err) => err.into_response(),
    }
}

async fn update_coupon(
    ValidPath(id): ValidPath<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidJson(payload): ValidJson<CouponInput>,
) -> Response {
    match coupon::update_coupon(&db, id, payload).await {
        Ok(coupon) => to_response(Json(coupon), Ok(())),
        Err(err) => err.into_response(),
    }
}
