use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ServiceError;
use crate::entities::address;
use crate::middleware::auth::Claims;

#[derive(Deserialize, Debug, Validate)]
pub struct AddressInput {
    #[validate(length(min = 1, max = 255))]
    pub address_line: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub id: i32,
    pub address_line: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl From<address::Model> for AddressResponse {
    fn from(value: address::Model) -> Self {
        AddressResponse {
            id: value.id,
            address_line: value.address_line,
            city: value.city,
            postal_code: value.postal_code,
            country: value.country,
        }
    }
}

pub async fn list_addresses(
    db: &DatabaseConnection,
    claims: &Claims,
) -> Result<Vec<AddressResponse>, ServiceError> {
    let addresses = address::Entity::find()
        .filter(address::Column::UserId.eq(claims.user_id))
        .order_by_asc(address::Column::Id)
        .all(db)
        .await?;
    Ok(addresses.into_iter().map(AddressResponse::from).collect())
}

pub async fn create_address(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: AddressInput,
) -> Result<AddressResponse, ServiceError> {
    let txn = db.begin().await?;
    let address = address::ActiveModel {
        user_id: Set(claims.user_id),
        address_line: Set(payload.address_line),
        city: Set(payload.city),
        postal_code: Set(payload.postal_code),
        country: Set(payload.country),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    Ok(address.into())
}

/// Orders that shipped to this address keep existing without one.
pub async fn delete_address(
    db: &DatabaseConnection,
    claims: &Claims,
    address_id: i32,
) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let address = find_owned(&txn, claims.user_id, address_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("No address with {} id was found.", address_id))
        })?;
    address::Entity::delete_by_id(address.id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

pub(crate) async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    address_id: i32,
) -> Result<Option<address::Model>, ServiceError> {
    Ok(address::Entity::find_by_id(address_id)
        .filter(address::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}
