use mockshop_shared::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A cart line: the product as it looked when added, without stock levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub price: Money,
}

/// A client-held shopping cart.
///
/// `total` is maintained incrementally by add and remove and always equals the
/// sum of the line prices. Lines are ordered by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub products: BTreeMap<String, CartItem>,
    #[serde(default)]
    pub total: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored title matching `title`, ignoring case.
    pub fn find_title(&self, title: &str) -> Option<&str> {
        if let Some((stored, _)) = self.products.get_key_value(title) {
            return Some(stored.as_str());
        }

        let needle = title.to_lowercase();
        self.products
            .keys()
            .find(|stored| stored.to_lowercase() == needle)
            .map(String::as_str)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.find_title(title).is_some()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Sum of the line prices. `None` if the sum is out of range.
    pub fn line_total(&self) -> Option<Money> {
        self.products
            .values()
            .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.price))
    }

    /// Check that `total` matches the lines. Carts come back from clients, so
    /// this is not guaranteed by construction.
    pub fn verify_total(&self) -> Result<(), CartTotalError> {
        let lines = self.line_total().ok_or(CartTotalError::Overflow)?;
        if lines != self.total {
            return Err(CartTotalError::Mismatch {
                stated: self.total,
                lines,
            });
        }
        Ok(())
    }

    /// Add a line and its price. The cart is untouched on error.
    pub(crate) fn add_line(&mut self, title: String, item: CartItem) -> Result<(), CartTotalError> {
        self.total = self
            .total
            .checked_add(item.price)
            .ok_or(CartTotalError::Overflow)?;
        self.products.insert(title, item);
        Ok(())
    }

    pub(crate) fn remove_line(&mut self, title: &str) -> Result<Option<CartItem>, CartTotalError> {
        let Some(stored) = self.find_title(title).map(str::to_string) else {
            return Ok(None);
        };
        let Some(price) = self.products.get(&stored).map(|item| item.price) else {
            return Ok(None);
        };

        self.total = self
            .total
            .checked_sub(price)
            .ok_or(CartTotalError::Overflow)?;
        Ok(self.products.remove(&stored))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartTotalError {
    #[error("Cart total {stated} does not match its lines ({lines})")]
    Mismatch {
        stated: Money,
        lines: Money,
    },

    #[error("Cart total out of range")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_cart_wire_shape() {
        let json = serde_json::to_value(Cart::new()).unwrap();
        assert_eq!(json, json!({"products": {}, "total": "$0.00"}));
    }

    #[test]
    fn test_client_cart_ignores_extra_fields() {
        let cart: Cart = serde_json::from_value(json!({
            "products": {"Widget": {"price": "$10.00", "inventoryCount": 7}},
            "total": "$10.00",
        }))
        .unwrap();

        assert_eq!(cart.products["Widget"], CartItem { price: Money::from_cents(1000) });
        assert!(cart.verify_total().is_ok());
    }

    #[test]
    fn test_lines_keep_total_in_step() {
        let mut cart = Cart::new();
        cart.add_line("Widget".into(), CartItem { price: Money::from_cents(1999) }).unwrap();
        cart.add_line("Gadget".into(), CartItem { price: Money::from_cents(1) }).unwrap();
        assert_eq!(cart.total, Money::from_cents(2000));
        assert_eq!(cart.line_total(), Some(cart.total));

        let removed = cart.remove_line("widget").unwrap().unwrap();
        assert_eq!(removed.price, Money::from_cents(1999));
        assert_eq!(cart.total, Money::from_cents(1));
        assert!(!cart.contains("Widget"));
        assert!(cart.remove_line("Widget").unwrap().is_none());
    }

    #[test]
    fn test_total_that_disagrees_with_lines() {
        let cart: Cart = serde_json::from_value(json!({
            "products": {"Widget": {"price": "$10.00"}},
            "total": "$4.00",
        }))
        .unwrap();

        assert_eq!(
            cart.verify_total(),
            Err(CartTotalError::Mismatch {
                stated: Money::from_cents(400),
                lines: Money::from_cents(1000),
            })
        );
    }

    #[test]
    fn test_add_line_out_of_range_leaves_cart_alone() {
        let mut cart: Cart = serde_json::from_value(json!({
            "products": {"Yacht": {"price": "$79228162514264337593543950335"}},
            "total": "$79228162514264337593543950335",
        }))
        .unwrap();
        assert!(cart.verify_total().is_ok());
        let before = cart.clone();

        let err = cart
            .add_line("Widget".into(), CartItem { price: Money::from_cents(1000) })
            .unwrap_err();
        assert_eq!(err, CartTotalError::Overflow);
        assert_eq!(cart, before);
    }
}
