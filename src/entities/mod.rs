pub mod address;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod coupon;
pub mod inventory;
pub mod order;
pub mod order_item;
pub mod product;
pub mod review;
pub mod user;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema,
    Set, TransactionTrait,
};
use tracing::info;

use crate::entities::user::Role;

macro_rules! create_tables {
    ($db:expr, $schema:expr, $($entity:expr),+ $(,)?) => {
        $(
            let mut statement = $schema.create_table_from_entity($entity);
            statement.if_not_exists();
            $db.execute($db.get_database_backend().build(&statement)).await?;
        )+
    };
}

/// Creates every table the service needs. Parents come before children so the
/// foreign keys resolve on backends that check them eagerly.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_tables!(
        db,
        schema,
        user::Entity,
        address::Entity,
        category::Entity,
        product::Entity,
        inventory::Entity,
        review::Entity,
        coupon::Entity,
        cart::Entity,
        cart_item::Entity,
        order::Entity,
        order_item::Entity,
    );

    Ok(())
}

/// Seeds an `admin` and a `user` account sharing one password. Accounts that
/// already exist are left alone, so restarts are harmless.
pub async fn primary_settup(db: &DatabaseConnection, password: &str) -> Result<(), DbErr> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| DbErr::Custom(format!("Failed to hash seed password: {err}")))?
        .to_string();

    let txn = db.begin().await?;
    for (username, role) in [("admin", Role::Admin), ("user", Role::User)] {
        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&txn)
            .await?;
        if existing.is_some() {
            continue;
        }

        let new_user = user::ActiveModel {
            username: Set(username.to_owned()),
            password: Set(password_hash.clone()),
            role: Set(role),
            ..Default::default()
        };
        user::Entity::insert(new_user).exec(&txn).await?;
        info!(username, role = %role, "Seeded account");
    }
    txn.commit().await
}
