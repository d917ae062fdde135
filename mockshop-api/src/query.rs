use axum::{extract::State, routing::post, Json, Router};
use mockshop_catalog::ProductMap;
use mockshop_core::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::str::FromStr;

use crate::error::AppError;
use crate::extract::{required, JsonBody};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleQueryRequest {
    pub title: Option<String>,
    pub only_in_stock: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQueryRequest {
    /// Must be a JSON number; kept loose so a string is a validation error
    pub price: Option<Value>,
    pub threshold: Option<String>,
    pub only_in_stock: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/querybytitle", post(query_by_title))
        .route("/querybyprice", post(query_by_price))
}

/// POST /querybytitle
async fn query_by_title(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TitleQueryRequest>,
) -> Result<Json<ProductMap>, AppError> {
    let title = required(req.title, "title")?;
    let only_in_stock = required(req.only_in_stock, "onlyInStock")?;

    let products = state.engine.query_by_title(&title, only_in_stock).await?;
    Ok(Json(products))
}

/// POST /querybyprice
async fn query_by_price(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<PriceQueryRequest>,
) -> Result<Json<ProductMap>, AppError> {
    let price = match required(req.price, "price")? {
        Value::Number(n) => parse_price(&n)?,
        _ => return Err(CoreError::ValidationError("`price` must be a number".into()).into()),
    };
    let threshold = required(req.threshold, "threshold")?;
    let only_in_stock = required(req.only_in_stock, "onlyInStock")?;

    let products = state
        .engine
        .query_by_price(price, &threshold, only_in_stock)
        .await?;
    Ok(Json(products))
}

fn parse_price(n: &Number) -> CoreResult<Decimal> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| CoreError::ValidationError(format!("`price` out of range: {}", text)))
}
