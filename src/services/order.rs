use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{
    address::find_owned,
    cart::{cart_lines, find_cart},
    coupon::find_applicable,
    format_timestamp, missing_product, ProductSummary, ServiceError,
};
use crate::entities::{cart_item, coupon, order, order_item, product};
use crate::middleware::auth::Claims;
use crate::pricing::{order_totals, LinePrice, OrderTotals, PriceBreakdown};

#[derive(Deserialize, Debug, Default, Validate)]
pub struct CreateOrder {
    pub address_id: Option<i32>,
    #[validate(length(min = 1, max = 50))]
    pub coupon_code: Option<String>,
}

/// Fulfillment flags are independent of each other; any subset may be set.
#[derive(Deserialize, Debug, Default, Validate)]
pub struct UpdateOrder {
    pub order_accepted: Option<bool>,
    pub payment_accepted: Option<bool>,
    pub being_delivered: Option<bool>,
    pub received: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product: ProductSummary,
    pub quantity: i32,
    #[serde(flatten)]
    pub price: PriceBreakdown,
}

#[derive(Debug, Serialize)]
pub struct AppliedCoupon {
    pub id: i32,
    pub code: String,
    pub amount: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: i32,
    pub address_id: Option<i32>,
    pub coupon: Option<AppliedCoupon>,
    pub order_accepted: bool,
    pub payment_accepted: bool,
    pub being_delivered: bool,
    pub received: bool,
    pub items: Vec<OrderItemResponse>,
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub created: String,
    pub updated: String,
}

async fn find_order<C: ConnectionTrait>(
    conn: &C,
    claims: &Claims,
    order_id: i32,
) -> Result<order::Model, ServiceError> {
    let mut query = order::Entity::find_by_id(order_id);
    if !claims.is_admin() {
        query = query.filter(order::Column::UserId.eq(claims.user_id));
    }
    query
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("No order with {} id was found.", order_id)))
}

async fn build_order<C: ConnectionTrait>(
    conn: &C,
    order: order::Model,
) -> Result<OrderResponse, ServiceError> {
    let lines = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .find_also_related(product::Entity)
        .order_by_asc(order_item::Column::Id)
        .all(conn)
        .await?;

    let coupon = match order.coupon_id {
        Some(coupon_id) => coupon::Entity::find_by_id(coupon_id).one(conn).await?,
        None => None,
    };

    let mut prices: Vec<LinePrice> = Vec::with_capacity(lines.len());
    let mut items = Vec::with_capacity(lines.len());
    for (item, product) in lines {
        let product = product.ok_or_else(|| missing_product(item.id))?;
        let line = product.line(item.quantity);
        prices.push(line);
        items.push(OrderItemResponse {
            id: item.id,
            product: (&product).into(),
            quantity: item.quantity,
            price: line.breakdown(),
        });
    }

    Ok(OrderResponse {
        id: order.id,
        user_id: order.user_id,
        address_id: order.address_id,
        totals: order_totals(&prices, coupon.as_ref().map(|c| c.amount)),
        coupon: coupon.map(|c| AppliedCoupon {
            id: c.id,
            code: c.code,
            amount: c.amount,
        }),
        order_accepted: order.order_accepted,
        payment_accepted: order.payment_accepted,
        being_delivered: order.being_delivered,
        received: order.received,
        items,
        created: format_timestamp(&order.created),
        updated: format_timestamp(&order.updated),
    })
}

/// Turns a cart into an order. The order lines are a copy of the cart lines
/// at this moment; the cart is emptied but kept.
pub async fn create_order(
    db: &DatabaseConnection,
    claims: &Claims,
    cart_id: i32,
    payload: CreateOrder,
) -> Result<OrderResponse, ServiceError> {
    let now = Utc::now();
    let txn = db.begin().await?;
    let cart = find_cart(&txn, claims, cart_id).await?;

    let lines = cart_lines(&txn, cart.id).await?;
    if lines.is_empty() {
        return Err(ServiceError::Validation(format!(
            "Cart {} has no items to order",
            cart.id
        )));
    }

    let address_id = match payload.address_id {
        Some(address_id) => {
            let address = find_owned(&txn, cart.user_id, address_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::Validation(format!(
                        "No address with {} id was found",
                        address_id
                    ))
                })?;
            Some(address.id)
        }
        None => None,
    };

    let coupon = match payload.coupon_code.as_deref() {
        Some(code) => Some(find_applicable(&txn, code).await?),
        None => None,
    };

    let order = order::ActiveModel {
        user_id: Set(cart.user_id),
        address_id: Set(address_id),
        coupon_id: Set(coupon.as_ref().map(|c| c.id)),
        order_accepted: Set(false),
        payment_accepted: Set(false),
        being_delivered: Set(false),
        received: Set(false),
        created: Set(now),
        updated: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let order_items: Vec<order_item::ActiveModel> = lines
        .iter()
        .map(|(item, _)| order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            created: Set(now),
            updated: Set(now),
            ..Default::default()
        })
        .collect();
    order_item::Entity::insert_many(order_items).exec(&txn).await?;

    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    let response = build_order(&txn, order).await?;
    txn.commit().await?;

    info!(
        order_id = response.id,
        cart_id = cart.id,
        items = response.items.len(),
        total = response.totals.total,
        "Created order from cart"
    );
    Ok(response)
}

/// Admins see every order, everyone else only their own.
pub async fn list_orders(
    db: &DatabaseConnection,
    claims: &Claims,
) -> Result<Vec<OrderResponse>, ServiceError> {
    let txn = db.begin().await?;
    let mut query = order::Entity::find().order_by_asc(order::Column::Id);
    if !claims.is_admin() {
        query = query.filter(order::Column::UserId.eq(claims.user_id));
    }
    let orders = query.all(&txn).await?;

    let mut response = Vec::with_capacity(orders.len());
    for order in orders {
        response.push(build_order(&txn, order).await?);
    }
    txn.commit().await?;
    Ok(response)
}

pub async fn get_order(
    db: &DatabaseConnection,
    claims: &Claims,
    order_id: i32,
) -> Result<OrderResponse, ServiceError> {
    let txn = db.begin().await?;
    let order = find_order(&txn, claims, order_id).await?;
    let response = build_order(&txn, order).await?;
    txn.commit().await?;
    Ok(response)
}

pub async fn update_order(
    db: &DatabaseConnection,
    claims: &Claims,
    order_id: i32,
    payload: UpdateOrder,
) -> Result<OrderResponse, ServiceError> {
    let txn = db.begin().await?;
    let order = find_order(&txn, claims, order_id).await?;

    let mut order: order::ActiveModel = order.into();
    if let Some(value) = payload.order_accepted {
        order.order_accepted = Set(value);
    }
    if let Some(value) = payload.payment_accepted {
        order.payment_accepted = Set(value);
    }
    if let Some(value) = payload.being_delivered {
        order.being_delivered = Set(value);
    }
    if let Some(value) = payload.received {
        order.received = Set(value);
    }
    order.updated = Set(Utc::now());
    let order = order.update(&txn).await?;

    let response = build_order(&txn, order).await?;
    txn.commit().await?;
    Ok(response)
}

pub async fn delete_order(
    db: &DatabaseConnection,
    claims: &Claims,
    order_id: i32,
) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let order = find_order(&txn, claims, order_id).await?;
    order::Entity::delete_by_id(order.id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}
