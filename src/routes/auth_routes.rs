use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use axum::{extract::Extension, http::StatusCode, response::Response, routing::post, Json, Router};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::config::AppConfig;
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::extract::ValidJson;
use crate::middleware::{
    auth::generate_token,
    logging::{to_response, ApiError},
};

pub fn auth_routes() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
}

// ROUTES
async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidJson(payload): ValidJson<CreateUser>,
) -> Response {
    let password = match hash_password(&payload.password) {
        Ok(password) => password,
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "An internal server error occured"
                    })),
                ),
                Err(ApiError::PasswordHashFailed(err.to_string())),
            );
        }
    };

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        password: Set(password),
        role: Set(Role::User),
        ..Default::default()
    };

    match UserEntity::insert(new_user).exec(&*db).await {
        Ok(_) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "User registered successfully"
                })),
            ),
            Ok(()),
        ),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => to_response(
                (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": "Username already exists"
                    })),
                ),
                Err(ApiError::General("Username already exists".into())),
            ),
            _ => to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            ),
        },
    }
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<AppConfig>>,
    ValidJson(payload): ValidJson<UserLogin>,
) -> Response {
    let result = UserEntity::find()
        .filter(user::Column::Username.eq(&*payload.username))
        .one(&*db)
        .await;

    let invalid = || {
        let tmp = "Invalid username or password";
        to_response(
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": tmp }))),
            Err(ApiError::General(tmp.to_owned())),
        )
    };

    match result {
        Ok(Some(model)) => match model.check_hash(&payload.password) {
            Ok(()) => match generate_token(model.id, model.role, &config) {
                Ok(token) => to_response(
                    (
                        StatusCode::OK,
                        Json(json!({
                            "token": token
                        })),
                    ),
                    Ok(()),
                ),
                Err(err) => to_response(
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": "Internal server error"
                        })),
                    ),
                    Err(ApiError::TokenGenerationFailed(err.to_string())),
                ),
            },
            Err(_) => invalid(),
        },
        Ok(None) => invalid(),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "An internal server error occured"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

//utilities
fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

//structs
#[derive(Deserialize, Debug, Validate)]
struct CreateUser {
    #[validate(length(min = 3, max = 32))]
    username: String,
    #[validate(length(min = 8, max = 128))]
    password: String,
}

#[derive(Deserialize, Debug, Validate)]
struct UserLogin {
    #[validate(length(min = 1))]
    username: String,
    #[validate(length(min = 1))]
    password: String,
}
