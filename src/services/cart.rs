use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{format_timestamp, missing_product, ProductSummary, ServiceError};
use crate::entities::{cart, cart_item, product};
use crate::middleware::auth::Claims;
use crate::pricing::{basket_total, LinePrice, PriceBreakdown};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

#[derive(Deserialize, Debug, Validate)]
pub struct AddCartItem {
    pub product_id: i32,
    #[validate(range(
        min = 1,
        max = 10_000,
        message = "Quantity should be between 1 and 10000"
    ))]
    pub quantity: i32,
}

#[derive(Deserialize, Debug, Validate)]
pub struct UpdateCartItem {
    #[validate(range(
        min = 1,
        max = 10_000,
        message = "Quantity should be between 1 and 10000"
    ))]
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: i32,
    pub cart_id: i32,
    pub product: ProductSummary,
    pub quantity: i32,
    #[serde(flatten)]
    pub price: PriceBreakdown,
}

impl CartItemResponse {
    fn new(item: cart_item::Model, product: &product::Model) -> Self {
        CartItemResponse {
            id: item.id,
            cart_id: item.cart_id,
            price: product.line(item.quantity).breakdown(),
            product: product.into(),
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: i32,
    pub user_id: i32,
    pub items: Vec<CartItemResponse>,
    pub total: f64,
    pub created: String,
    pub updated: String,
}

/// Looks a cart up the way its owner sees it. Admins see every cart; anyone
/// else gets a not-found for carts they do not own.
pub(crate) async fn find_cart<C: ConnectionTrait>(
    conn: &C,
    claims: &Claims,
    cart_id: i32,
) -> Result<cart::Model, ServiceError> {
    let mut query = cart::Entity::find_by_id(cart_id);
    if !claims.is_admin() {
        query = query.filter(cart::Column::UserId.eq(claims.user_id));
    }
    query
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("No cart with {} id was found.", cart_id)))
}

/// Cart lines joined with the product they price against.
pub(crate) async fn cart_lines<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<Vec<(cart_item::Model, product::Model)>, ServiceError> {
    cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .find_also_related(product::Entity)
        .order_by_asc(cart_item::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(|(item, product)| match product {
            Some(product) => Ok((item, product)),
            None => Err(missing_product(item.id)),
        })
        .collect()
}

async fn build_cart<C: ConnectionTrait>(
    conn: &C,
    cart: cart::Model,
) -> Result<CartResponse, ServiceError> {
    let lines = cart_lines(conn, cart.id).await?;
    let prices: Vec<LinePrice> = lines
        .iter()
        .map(|(item, product)| product.line(item.quantity))
        .collect();

    Ok(CartResponse {
        id: cart.id,
        user_id: cart.user_id,
        total: basket_total(&prices),
        items: lines
            .into_iter()
            .map(|(item, product)| CartItemResponse::new(item, &product))
            .collect(),
        created: format_timestamp(&cart.created),
        updated: format_timestamp(&cart.updated),
    })
}

async fn find_item<C: ConnectionTrait>(
    conn: &C,
    claims: &Claims,
    cart_id: i32,
    item_id: i32,
) -> Result<(cart::Model, cart_item::Model, product::Model), ServiceError> {
    let cart = find_cart(conn, claims, cart_id).await?;
    let found = cart_item::Entity::find_by_id(item_id)
        .filter(cart_item::Column::CartId.eq(cart_id))
        .find_also_related(product::Entity)
        .one(conn)
        .await?;
    match found {
        Some((item, Some(product))) => Ok((cart, item, product)),
        Some((item, None)) => Err(missing_product(item.id)),
        None => Err(ServiceError::NotFound(format!(
            "No related entry with {} id was found.",
            item_id
        ))),
    }
}

/// Carts owned by the caller.
pub async fn list_carts(
    db: &DatabaseConnection,
    claims: &Claims,
) -> Result<Vec<CartResponse>, ServiceError> {
    let txn = db.begin().await?;
    let carts = cart::Entity::find()
        .filter(cart::Column::UserId.eq(claims.user_id))
        .order_by_asc(cart::Column::Id)
        .all(&txn)
        .await?;

    let mut response = Vec::with_capacity(carts.len());
    for cart in carts {
        response.push(build_cart(&txn, cart).await?);
    }
    txn.commit().await?;
    Ok(response)
}

pub async fn create_cart(
    db: &DatabaseConnection,
    claims: &Claims,
) -> Result<CartResponse, ServiceError> {
    let now = Utc::now();
    let txn = db.begin().await?;
    let cart = cart::ActiveModel {
        user_id: Set(claims.user_id),
        created: Set(now),
        updated: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(cart_id = cart.id, user_id = claims.user_id, "Created cart");
    Ok(CartResponse {
        id: cart.id,
        user_id: cart.user_id,
        items: Vec::new(),
        total: 0.0,
        created: format_timestamp(&cart.created),
        updated: format_timestamp(&cart.updated),
    })
}

pub async fn get_cart(
    db: &DatabaseConnection,
    claims: &Claims,
    cart_id: i32,
) -> Result<CartResponse, ServiceError> {
    let txn = db.begin().await?;
    let cart = find_cart(&txn, claims, cart_id).await?;
    let response = build_cart(&txn, cart).await?;
    txn.commit().await?;
    Ok(response)
}

pub async fn delete_cart(
    db: &DatabaseConnection,
    claims: &Claims,
    cart_id: i32,
) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let cart = find_cart(&txn, claims, cart_id).await?;
    cart::Entity::delete_by_id(cart.id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

pub async fn list_items(
    db: &DatabaseConnection,
    claims: &Claims,
    cart_id: i32,
) -> Result<Vec<CartItemResponse>, ServiceError> {
    let txn = db.begin().await?;
    find_cart(&txn, claims, cart_id).await?;
    let lines = cart_lines(&txn, cart_id).await?;
    txn.commit().await?;

    Ok(lines
        .into_iter()
        .map(|(item, product)| CartItemResponse::new(item, &product))
        .collect())
}

/// Adds a product to the cart. A product already in the cart has its
/// quantity increased instead of getting a second line; the flag tells the
/// two cases apart.
pub async fn add_item(
    db: &DatabaseConnection,
    claims: &Claims,
    cart_id: i32,
    payload: AddCartItem,
) -> Result<(CartItemResponse, bool), ServiceError> {
    let now = Utc::now();
    let txn = db.begin().await?;
    let cart = find_cart(&txn, claims, cart_id).await?;

    let product = product::Entity::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            ServiceError::Validation(format!(
                "No product with {} id was found",
                payload.product_id
            ))
        })?;

    let existing = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product.id))
        .one(&txn)
        .await?;

    let (item, created) = match existing {
        Some(entry) => {
            let quantity = entry
                .quantity
                .checked_add(payload.quantity)
                .filter(|quantity| *quantity <= MAX_LINE_QUANTITY)
                .ok_or_else(|| {
                    ServiceError::Validation(format!(
                        "A cart line holds at most {} units",
                        MAX_LINE_QUANTITY
                    ))
                })?;
            let mut entry: cart_item::ActiveModel = entry.into();
            entry.quantity = Set(quantity);
            entry.updated = Set(now);
            (entry.update(&txn).await?, false)
        }
        None => {
            let entry = cart_item::ActiveModel {
                cart_id: Set(cart.id),
                product_id: Set(product.id),
                quantity: Set(payload.quantity),
                created: Set(now),
                updated: Set(now),
                ..Default::default()
            };
            (entry.insert(&txn).await?, true)
        }
    };
    touch_cart(&txn, cart).await?;
    txn.commit().await?;

    Ok((CartItemResponse::new(item, &product), created))
}

pub async fn get_item(
    db: &DatabaseConnection,
    claims: &Claims,
    cart_id: i32,
    item_id: i32,
) -> Result<CartItemResponse, ServiceError> {
    let txn = db.begin().await?;
    let (_, item, product) = find_item(&txn, claims, cart_id, item_id).await?;
    txn.commit().await?;
    Ok(CartItemResponse::new(item, &product))
}

pub async fn update_item(
    db: &DatabaseConnection,
    claims: &Claims,
    cart_id: i32,
    item_id: i32,
    payload: UpdateCartItem,
) -> Result<CartItemResponse, ServiceError> {
    let now = Utc::now();
    let txn = db.begin().await?;
    let (cart, item, product) = find_item(&txn, claims, cart_id, item_id).await?;

    let mut item: cart_item::ActiveModel = item.into();
    item.quantity = Set(payload.quantity);
    item.updated = Set(now);
    let item = item.update(&txn).await?;
    touch_cart(&txn, cart).await?;
    txn.commit().await?;

    Ok(CartItemResponse::new(item, &product))
}

pub async fn delete_item(
    db: &DatabaseConnection,
    claims: &Claims,
    cart_id: i32,
    item_id: i32,
) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let (_, item, _) = find_item(&txn, claims, cart_id, item_id).await?;
    cart_item::Entity::delete_by_id(item.id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

async fn touch_cart<C: ConnectionTrait>(conn: &C, cart: cart::Model) -> Result<(), ServiceError> {
    let mut cart: cart::ActiveModel = cart.into();
    cart.updated = Set(Utc::now());
    cart.update(conn).await?;
    Ok(())
}
