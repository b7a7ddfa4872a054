use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use validator::Validate;

use super::{format_timestamp, ServiceError};
use crate::entities::{category, inventory, product, review, user};
use crate::middleware::auth::Claims;

#[derive(Deserialize, Debug, Default)]
pub struct ProductsQuery {
    pub category: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Deserialize, Debug, Default, Validate)]
pub struct InventoryInput {
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub discount_price: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub weight: f64,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    #[validate(nested)]
    pub category: CategoryInput,
    #[validate(nested)]
    pub inventory: InventoryInput,
}

/// A `discount_price` of zero removes the discount.
#[derive(Deserialize, Debug, Default, Validate)]
pub struct PatchProduct {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub discount_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    #[validate(range(min = 0))]
    pub inventory_quantity: Option<i32>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct ReviewInput {
    #[validate(length(min = 1))]
    pub product_name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: f64,
}

#[derive(Debug, Serialize)]
pub struct CategoryName {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub quantity: i32,
    pub sold: i32,
    pub updated: String,
}

impl From<inventory::Model> for InventoryResponse {
    fn from(value: inventory::Model) -> Self {
        InventoryResponse {
            quantity: value.quantity,
            sold: value.sold,
            updated: format_timestamp(&value.updated),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListItem {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub inventory: Option<InventoryResponse>,
    pub category: CategoryName,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub weight: f64,
    pub inventory: Option<InventoryResponse>,
    pub category: CategoryName,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i32,
    pub username: String,
    pub product_name: String,
    pub description: String,
    pub rating: f64,
    pub created: String,
    pub updated: String,
}

pub fn product_url(product_id: i32) -> String {
    format!("/api/product/{product_id}")
}

fn product_not_found(product_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("No product with {} id was found.", product_id))
}

fn missing_category(product_id: i32) -> ServiceError {
    ServiceError::Internal(format!("Product {product_id} references a missing category"))
}

async fn product_detail<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<ProductDetail, ServiceError> {
    let (product, category) = product::Entity::find_by_id(product_id)
        .find_also_related(category::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| product_not_found(product_id))?;
    let category = category.ok_or_else(|| missing_category(product.id))?;
    let inventory = inventory::Entity::find()
        .filter(inventory::Column::ProductId.eq(product.id))
        .one(conn)
        .await?;

    Ok(ProductDetail {
        id: product.id,
        name: product.name,
        short_description: product.short_description,
        long_description: product.long_description,
        price: product.price,
        discount_price: product.discount_price,
        weight: product.weight,
        inventory: inventory.map(InventoryResponse::from),
        category: CategoryName {
            name: category.name,
        },
        created: format_timestamp(&product.created),
        updated: format_timestamp(&product.updated),
    })
}

pub async fn list_products(
    db: &DatabaseConnection,
    query: ProductsQuery,
) -> Result<Vec<ProductListItem>, ServiceError> {
    let mut finder = product::Entity::find()
        .find_also_related(category::Entity)
        .order_by_asc(product::Column::Id);

    if let Some(name) = query.category {
        finder = finder.filter(category::Column::Name.eq(name));
    }
    if let Some(min) = query.min {
        finder = finder.filter(product::Column::Price.gte(min));
    }
    if let Some(max) = query.max {
        finder = finder.filter(product::Column::Price.lte(max));
    }

    let products = finder.all(db).await?;
    let ids: Vec<i32> = products.iter().map(|(product, _)| product.id).collect();
    let mut inventories: HashMap<i32, inventory::Model> = inventory::Entity::find()
        .filter(inventory::Column::ProductId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|inventory| (inventory.product_id, inventory))
        .collect();

    products
        .into_iter()
        .map(|(product, category)| {
            let category = category.ok_or_else(|| missing_category(product.id))?;
            Ok(ProductListItem {
                url: product_url(product.id),
                inventory: inventories.remove(&product.id).map(InventoryResponse::from),
                id: product.id,
                name: product.name,
                price: product.price,
                discount_price: product.discount_price,
                category: CategoryName {
                    name: category.name,
                },
            })
        })
        .collect()
}

pub async fn get_product(
    db: &DatabaseConnection,
    product_id: i32,
) -> Result<ProductDetail, ServiceError> {
    product_detail(db, product_id).await
}

pub async fn list_categories(
    db: &DatabaseConnection,
) -> Result<Vec<CategoryResponse>, ServiceError> {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;
    Ok(categories
        .into_iter()
        .map(|category| CategoryResponse {
            id: category.id,
            name: category.name,
            created: format_timestamp(&category.created),
            updated: format_timestamp(&category.updated),
        })
        .collect())
}

/// Creates the product with its inventory row. The category is looked up by
/// name and created when it does not exist yet.
pub async fn create_product(
    db: &DatabaseConnection,
    payload: ProductInput,
) -> Result<ProductDetail, ServiceError> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let category = match category::Entity::find()
        .filter(category::Column::Name.eq(payload.category.name.as_str()))
        .one(&txn)
        .await?
    {
        Some(category) => category,
        None => {
            category::ActiveModel {
                name: Set(payload.category.name),
                created: Set(now),
                updated: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let product = product::ActiveModel {
        name: Set(payload.name),
        price: Set(payload.price),
        discount_price: Set(payload.discount_price.filter(|discount| *discount != 0.0)),
        weight: Set(payload.weight),
        short_description: Set(payload.short_description),
        long_description: Set(payload.long_description),
        category_id: Set(category.id),
        created: Set(now),
        updated: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    inventory::ActiveModel {
        product_id: Set(product.id),
        quantity: Set(payload.inventory.quantity.unwrap_or(0)),
        sold: Set(0),
        updated: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let detail = product_detail(&txn, product.id).await?;
    txn.commit().await?;

    info!(product_id = detail.id, name = %detail.name, "Created product");
    Ok(detail)
}

/// Price changes apply to every cart immediately, since cart totals are
/// always computed from the current product row.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i32,
    payload: PatchProduct,
) -> Result<ProductDetail, ServiceError> {
    let now = Utc::now();
    let txn = db.begin().await?;
    let product = product::Entity::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| product_not_found(product_id))?;

    let mut product: product::ActiveModel = product.into();
    if let Some(name) = payload.name {
        product.name = Set(name);
    }
    if let Some(price) = payload.price {
        product.price = Set(price);
    }
    if let Some(discount) = payload.discount_price {
        product.discount_price = Set(Some(discount).filter(|discount| *discount != 0.0));
    }
    if let Some(weight) = payload.weight {
        product.weight = Set(weight);
    }
    if let Some(short_description) = payload.short_description {
        product.short_description = Set(Some(short_description));
    }
    if let Some(long_description) = payload.long_description {
        product.long_description = Set(Some(long_description));
    }
    product.updated = Set(now);
    product.update(&txn).await?;

    if let Some(quantity) = payload.inventory_quantity {
        if let Some(stock) = inventory::Entity::find()
            .filter(inventory::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?
        {
            let mut stock: inventory::ActiveModel = stock.into();
            stock.quantity = Set(quantity);
            stock.updated = Set(now);
            stock.update(&txn).await?;
        }
    }

    let detail = product_detail(&txn, product_id).await?;
    txn.commit().await?;
    Ok(detail)
}

/// Cart lines, order lines, reviews and the inventory row go with it.
pub async fn delete_product(db: &DatabaseConnection, product_id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let result = product::Entity::delete_by_id(product_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(product_not_found(product_id));
    }
    txn.commit().await?;

    info!(product_id, "Deleted product");
    Ok(())
}

pub async fn create_review(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: ReviewInput,
) -> Result<ReviewResponse, ServiceError> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let product = product::Entity::find()
        .filter(product::Column::Name.eq(payload.product_name.as_str()))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            ServiceError::Validation(format!(
                "No product named '{}' was found",
                payload.product_name
            ))
        })?;
    let author = user::Entity::find_by_id(claims.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Reviewing user no longer exists".into()))?;

    let review = review::ActiveModel {
        user_id: Set(author.id),
        product_id: Set(product.id),
        description: Set(payload.description),
        rating: Set(payload.rating),
        created: Set(now),
        updated: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok(ReviewResponse {
        id: review.id,
        username: author.username,
        product_name: product.name,
        description: review.description,
        rating: review.rating,
        created: format_timestamp(&review.created),
        updated: format_timestamp(&review.updated),
    })
}

pub async fn list_reviews(
    db: &DatabaseConnection,
    product_id: i32,
) -> Result<Vec<ReviewResponse>, ServiceError> {
    let product = product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| product_not_found(product_id))?;

    let reviews = review::Entity::find()
        .filter(review::Column::ProductId.eq(product.id))
        .find_also_related(user::Entity)
        .order_by_asc(review::Column::Id)
        .all(db)
        .await?;

    Ok(reviews
        .into_iter()
        .map(|(review, author)| ReviewResponse {
            id: review.id,
            username: author.map(|author| author.username).unwrap_or_default(),
            product_name: product.name.clone(),
            description: review.description,
            rating: review.rating,
            created: format_timestamp(&review.created),
            updated: format_timestamp(&review.updated),
        })
        .collect())
}
