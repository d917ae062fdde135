use mockshop_shared::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A catalog entry. The title is the key of the surrounding map, not a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub price: Money,
    pub inventory_count: u32,
}

impl ProductRecord {
    pub fn new(price: Money, inventory_count: u32) -> Self {
        Self {
            price,
            inventory_count,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.inventory_count > 0
    }
}

/// Products keyed by title, in title order.
pub type ProductMap = BTreeMap<String, ProductRecord>;

/// How a product price is matched against a query price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceComparator {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

impl PriceComparator {
    /// Map a request threshold token (`exact`, `above`, `below`) to a comparator.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "exact" => Some(Self::Equal),
            "above" => Some(Self::GreaterOrEqual),
            "below" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    pub fn matches(&self, price: Decimal, query: Decimal) -> bool {
        match self {
            Self::Equal => price == query,
            Self::GreaterOrEqual => price >= query,
            Self::LessOrEqual => price <= query,
        }
    }
}
