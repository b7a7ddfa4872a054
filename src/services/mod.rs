//! Validated mutations and scoped queries behind the HTTP routes.
//!
//! Every public function runs against one transaction and returns the
//! response body the route serializes.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod order;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{prelude::DateTimeUtc, DbErr, SqlErr};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::entities::product;
use crate::middleware::logging::{to_response, ApiError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Db(String),
    #[error("{0}")]
    Internal(String),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                ServiceError::Conflict(format!("Resource already exists: {detail}"))
            }
            _ => ServiceError::Db(err.to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message, ext) = match self {
            ServiceError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, msg.clone(), ApiError::NotFound(msg))
            }
            ServiceError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                ApiError::ValidationFail(msg),
            ),
            ServiceError::Conflict(msg) => {
                (StatusCode::CONFLICT, msg.clone(), ApiError::General(msg))
            }
            ServiceError::Db(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
                ApiError::DbError(msg),
            ),
            ServiceError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
                ApiError::General(msg),
            ),
        };

        to_response((status, Json(json!({ "error": message }))), Err(ext))
    }
}

pub fn format_timestamp(value: &DateTimeUtc) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Product as embedded in cart and order lines.
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub discount_price: Option<f64>,
}

impl From<&product::Model> for ProductSummary {
    fn from(value: &product::Model) -> Self {
        ProductSummary {
            id: value.id,
            name: value.name.clone(),
            price: value.price,
            discount_price: value.discount_price,
        }
    }
}

fn missing_product(line_id: i32) -> ServiceError {
    ServiceError::Internal(format!("Line {line_id} references a missing product"))
}
