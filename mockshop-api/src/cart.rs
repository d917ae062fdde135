use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use mockshop_cart::{AddError, Cart, CheckoutError, RemoveError};
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::{required, JsonBody};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CartProductRequest {
    pub cart: Option<Cart>,
    pub product: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    pub cart: Option<Cart>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/createcart", post(create_cart))
        .route("/addcart", post(add_to_cart))
        .route("/removecart", post(remove_from_cart))
        .route("/checkoutcart", post(checkout_cart))
}

/// POST /createcart
async fn create_cart(State(state): State<AppState>) -> Json<Cart> {
    Json(state.engine.create_cart())
}

/// POST /addcart
async fn add_to_cart(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CartProductRequest>,
) -> Result<Json<Cart>, AppError> {
    let mut cart = req.cart.ok_or(AddError::CartMissing)?;
    let product = required(req.product, "product")?;

    state.engine.add_to_cart(&mut cart, &product).await?;
    Ok(Json(cart))
}

/// POST /removecart
async fn remove_from_cart(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CartProductRequest>,
) -> Result<Json<Cart>, AppError> {
    let mut cart = req.cart.ok_or(RemoveError::CartMissing)?;
    let product = required(req.product, "product")?;

    state.engine.remove_from_cart(&mut cart, &product)?;
    Ok(Json(cart))
}

/// POST /checkoutcart
/// Purchases every line; earlier lines stay purchased if a later one fails.
async fn checkout_cart(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CheckoutRequest>,
) -> Result<StatusCode, AppError> {
    let cart = req.cart.ok_or(CheckoutError::CartMissing)?;

    state.engine.checkout(&cart).await?;
    Ok(StatusCode::OK)
}
