use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use mockshop_core::{CoreError, CoreResult};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body that tolerates an absent body.
///
/// An empty body (or one without a JSON content type) deserializes as
/// `T::default()`, so a bare `POST /addcart` is judged on its missing fields
/// rather than rejected as unparseable.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::ValidationError(format!("Invalid request body: {}", e)))
    }
}

/// Unwrap a field the operation cannot run without.
pub fn required<T>(value: Option<T>, field: &str) -> CoreResult<T> {
    value.ok_or_else(|| CoreError::ValidationError(format!("missing field `{}`", field)))
}
