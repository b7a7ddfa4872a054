use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    response::Response,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

use crate::middleware::logging::{to_response, ApiError};

/// JSON body that has also passed its `validator` rules. Any rejection,
/// malformed JSON and missing fields included, is a 400.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| bad_request(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| bad_request(errors.to_string()))?;

        Ok(ValidJson(value))
    }
}

/// Path parameters with the same 400 body as every other bad input.
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| bad_request(rejection.body_text()))?;

        Ok(ValidPath(value))
    }
}

fn bad_request(message: String) -> Response {
    to_response(
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))),
        Err(ApiError::ValidationFail(message)),
    )
}
