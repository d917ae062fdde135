use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mockshop_cart::{AddError, CheckoutError, QueryError, RemoveError};
use mockshop_catalog::PurchaseError;
use mockshop_core::CoreError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request fields
    ValidationError(String),
    /// Well-formed request the cart cannot honour (duplicate add, unknown line)
    BadRequestError(String),
    ForbiddenError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadRequestError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ForbiddenError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}

impl From<AddError> for AppError {
    fn from(err: AddError) -> Self {
        let msg = err.to_string();
        match err {
            AddError::CartMissing => AppError::ForbiddenError(msg),
            AddError::AlreadyInCart(_) => AppError::BadRequestError(msg),
            AddError::NotFound(_) => AppError::NotFoundError(msg),
            AddError::InvalidCart(_) => AppError::BadRequestError(msg),
            AddError::Catalog(_) => AppError::InternalServerError(msg),
        }
    }
}

impl From<RemoveError> for AppError {
    fn from(err: RemoveError) -> Self {
        let msg = err.to_string();
        match err {
            RemoveError::CartMissing => AppError::ForbiddenError(msg),
            RemoveError::NotInCart(_) => AppError::BadRequestError(msg),
            RemoveError::InvalidCart(_) => AppError::BadRequestError(msg),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        let msg = err.to_string();
        match err {
            CheckoutError::CartMissing => AppError::ForbiddenError(msg),
            CheckoutError::InvalidCart(_) => AppError::BadRequestError(msg),
            // A product that no longer exists is reported as forbidden, a sold
            // out one as not found
            CheckoutError::PurchaseFailed { reason, .. } => match reason {
                PurchaseError::NotFound(_) => AppError::ForbiddenError(msg),
                PurchaseError::OutOfStock(_) => AppError::NotFoundError(msg),
                PurchaseError::Contention { .. } => AppError::ConflictError(msg),
                PurchaseError::Catalog(_) => AppError::InternalServerError(msg),
            },
        }
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        let msg = err.to_string();
        match err {
            QueryError::Validation(_) => AppError::ValidationError(msg),
            QueryError::Catalog(_) => AppError::InternalServerError(msg),
        }
    }
}
