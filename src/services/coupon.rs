use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{format_timestamp, ServiceError};
use crate::entities::coupon;

static COUPON_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,50}$").expect("coupon code pattern is valid"));

#[derive(Deserialize, Debug, Validate)]
pub struct CouponInput {
    #[validate(regex(
        path = *COUPON_CODE_REGEX,
        message = "Code must be 1-50 Latin letters, numbers, '-' or '_'"
    ))]
    pub code: String,
    #[validate(range(min = 0, message = "Amount must not be negative"))]
    pub amount: i32,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub id: i32,
    pub code: String,
    pub amount: i32,
    pub is_active: bool,
    pub created: String,
    pub updated: String,
}

impl From<coupon::Model> for CouponResponse {
    fn from(value: coupon::Model) -> Self {
        CouponResponse {
            id: value.id,
            code: value.code,
            amount: value.amount,
            is_active: value.is_active,
            created: format_timestamp(&value.created),
            updated: format_timestamp(&value.updated),
        }
    }
}

pub async fn list_coupons(db: &DatabaseConnection) -> Result<Vec<CouponResponse>, ServiceError> {
    let coupons = coupon::Entity::find()
        .order_by_asc(coupon::Column::Id)
        .all(db)
        .await?;
    Ok(coupons.into_iter().map(CouponResponse::from).collect())
}

pub async fn create_coupon(
    db: &DatabaseConnection,
    payload: CouponInput,
) -> Result<CouponResponse, ServiceError> {
    let now = Utc::now();
    let txn = db.begin().await?;
    let coupon = coupon::ActiveModel {
        code: Set(payload.code),
        amount: Set(payload.amount),
        is_active: Set(payload.is_active),
        created: Set(now),
        updated: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(coupon_id = coupon.id, code = %coupon.code, "Created coupon");
    Ok(coupon.into())
}

pub async fn get_coupon(
    db: &DatabaseConnection,
    coupon_id: i32,
) -> Result<CouponResponse, ServiceError> {
    coupon::Entity::find_by_id(coupon_id)
        .one(db)
        .await?
        .map(CouponResponse::from)
        .ok_or_else(|| not_found(coupon_id))
}

/// Replaces every field of the coupon; this is also how a coupon gets
/// switched on and off.
pub async fn update_coupon(
    db: &DatabaseConnection,
    coupon_id: i32,
    payload: CouponInput,
) -> Result<CouponResponse, ServiceError> {
    let txn = db.begin().await?;
    let coupon = coupon::Entity::find_by_id(coupon_id)
        .one(&txn)
        .await?
        .ok_or_else(|| not_found(coupon_id))?;

    let mut coupon: coupon::ActiveModel = coupon.into();
    coupon.code = Set(payload.code);
    coupon.amount = Set(payload.amount);
    coupon.is_active = Set(payload.is_active);
    coupon.updated = Set(Utc::now());
    let coupon = coupon.update(&txn).await?;
    txn.commit().await?;

    info!(coupon_id = coupon.id, is_active = coupon.is_active, "Updated coupon");
    Ok(coupon.into())
}

/// Resolves a code for checkout. Inactive coupons cannot be applied.
pub(crate) async fn find_applicable<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> Result<coupon::Model, ServiceError> {
    let coupon = coupon::Entity::find()
        .filter(coupon::Column::Code.eq(code))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::Validation(format!("Unknown coupon code '{code}'")))?;

    if !coupon.is_active {
        return Err(ServiceError::Validation(format!(
            "Coupon '{code}' is not active"
        )));
    }
    Ok(coupon)
}

fn not_found(coupon_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("No coupon with {} id was found.", coupon_id))
}
