use crate::models::{Cart, CartItem, CartTotalError};
use mockshop_catalog::{Catalog, CatalogError, PriceComparator, ProductMap, PurchaseError};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cart operations validated against the catalog.
///
/// Carts are owned by the caller and passed in on every call; the engine keeps
/// no per-cart state.
pub struct CartEngine {
    catalog: Arc<Catalog>,
}

impl CartEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn create_cart(&self) -> Cart {
        Cart::new()
    }

    /// Add one unit of an in-stock product. The cart is untouched on error.
    ///
    /// The stock check does not reserve anything; checkout can still find the
    /// product sold out.
    pub async fn add_to_cart(&self, cart: &mut Cart, title: &str) -> Result<(), AddError> {
        cart.verify_total()?;
        if cart.contains(title) {
            return Err(AddError::AlreadyInCart(title.to_string()));
        }

        let found = self.catalog.find_by_title(title, true, true).await?;
        let (stored_title, record) = found
            .into_iter()
            .next()
            .ok_or_else(|| AddError::NotFound(title.to_string()))?;

        debug!("Adding {} at {} to cart", stored_title, record.price);
        cart.add_line(stored_title, CartItem { price: record.price })?;
        Ok(())
    }

    pub fn remove_from_cart(&self, cart: &mut Cart, title: &str) -> Result<(), RemoveError> {
        cart.verify_total()?;
        let item = cart
            .remove_line(title)?
            .ok_or_else(|| RemoveError::NotInCart(title.to_string()))?;

        debug!("Removed {} at {} from cart", title, item.price);
        Ok(())
    }

    /// Purchase every line of the cart, in title order.
    ///
    /// Stops at the first failure. Lines purchased before it stay purchased;
    /// they are reported in the error.
    pub async fn checkout(&self, cart: &Cart) -> Result<(), CheckoutError> {
        cart.verify_total()?;
        let mut purchased = Vec::with_capacity(cart.len());

        for title in cart.products.keys() {
            if let Err(reason) = self.catalog.purchase(title).await {
                if !purchased.is_empty() {
                    warn!(
                        "Checkout stopped at {} ({}); already purchased: {:?}",
                        title, reason, purchased
                    );
                }
                return Err(CheckoutError::PurchaseFailed {
                    title: title.clone(),
                    purchased,
                    reason,
                });
            }
            purchased.push(title.clone());
        }

        info!("Checked out {} products for {}", purchased.len(), cart.total);
        Ok(())
    }

    /// Substring search over titles.
    pub async fn query_by_title(
        &self,
        title: &str,
        only_in_stock: bool,
    ) -> Result<ProductMap, QueryError> {
        Ok(self.catalog.find_by_title(title, false, only_in_stock).await?)
    }

    /// Price search; `threshold` is one of `exact`, `above` or `below`.
    pub async fn query_by_price(
        &self,
        price: Decimal,
        threshold: &str,
        only_in_stock: bool,
    ) -> Result<ProductMap, QueryError> {
        let comparator = PriceComparator::from_token(threshold)
            .ok_or_else(|| QueryError::Validation(format!("unknown threshold {:?}", threshold)))?;

        Ok(self
            .catalog
            .find_by_price(price, comparator, only_in_stock)
            .await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddError {
    #[error("No cart supplied")]
    CartMissing,

    #[error("Product already in cart: {0}")]
    AlreadyInCart(String),

    #[error("Product not found or out of stock: {0}")]
    NotFound(String),

    #[error(transparent)]
    InvalidCart(#[from] CartTotalError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveError {
    #[error("No cart supplied")]
    CartMissing,

    #[error("Product not in cart: {0}")]
    NotInCart(String),

    #[error(transparent)]
    InvalidCart(#[from] CartTotalError),
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("No cart supplied")]
    CartMissing,

    #[error(transparent)]
    InvalidCart(#[from] CartTotalError),

    #[error("Checkout failed at {title}: {reason}")]
    PurchaseFailed {
        title: String,
        /// Titles purchased before the failure. These are not rolled back.
        purchased: Vec<String>,
        #[source]
        reason: PurchaseError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid query: {0}")]
    Validation(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockshop_catalog::DEFAULT_DOCUMENT_KEY;
    use mockshop_core::DocumentStore;
    use mockshop_shared::Money;
    use mockshop_store::MemoryStore;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    fn engine_with(doc: Value) -> (Arc<MemoryStore>, CartEngine) {
        let store = Arc::new(MemoryStore::with_documents([(DEFAULT_DOCUMENT_KEY, doc)]));
        let catalog = Catalog::new(store.clone(), DEFAULT_DOCUMENT_KEY);
        (store, CartEngine::new(Arc::new(catalog)))
    }

    async fn inventory_of(store: &MemoryStore, title: &str) -> u64 {
        let doc = store.get(DEFAULT_DOCUMENT_KEY).await.unwrap().unwrap();
        doc.value[title]["inventoryCount"].as_u64().unwrap()
    }

    fn widget_catalog() -> Value {
        json!({"Widget": {"price": "$10.00", "inventoryCount": 2}})
    }

    #[tokio::test]
    async fn test_add_then_checkout() {
        let (store, engine) = engine_with(widget_catalog());

        let mut cart = engine.create_cart();
        assert_eq!(serde_json::to_value(&cart).unwrap(), json!({"products": {}, "total": "$0.00"}));

        engine.add_to_cart(&mut cart, "Widget").await.unwrap();
        assert_eq!(
            serde_json::to_value(&cart).unwrap(),
            json!({"products": {"Widget": {"price": "$10.00"}}, "total": "$10.00"})
        );

        engine.checkout(&cart).await.unwrap();
        assert_eq!(inventory_of(&store, "Widget").await, 1);

        // The cart itself is left as it was
        assert_eq!(cart.total, Money::from_cents(1000));
    }

    #[tokio::test]
    async fn test_duplicate_add_leaves_cart_unchanged() {
        let (_, engine) = engine_with(widget_catalog());
        let mut cart = engine.create_cart();
        engine.add_to_cart(&mut cart, "Widget").await.unwrap();
        let before = cart.clone();

        let err = engine.add_to_cart(&mut cart, "Widget").await.unwrap_err();
        assert!(matches!(err, AddError::AlreadyInCart(_)));

        let err = engine.add_to_cart(&mut cart, "WIDGET").await.unwrap_err();
        assert!(matches!(err, AddError::AlreadyInCart(_)));
        assert_eq!(cart, before);
    }

    #[tokio::test]
    async fn test_add_requires_stock() {
        let (_, engine) = engine_with(json!({
            "Widget": {"price": "$10.00", "inventoryCount": 0},
        }));
        let mut cart = engine.create_cart();

        let err = engine.add_to_cart(&mut cart, "Widget").await.unwrap_err();
        assert!(matches!(err, AddError::NotFound(_)));

        let err = engine.add_to_cart(&mut cart, "Gizmo").await.unwrap_err();
        assert!(matches!(err, AddError::NotFound(_)));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_uses_stored_title() {
        let (_, engine) = engine_with(widget_catalog());
        let mut cart = engine.create_cart();

        engine.add_to_cart(&mut cart, "widget").await.unwrap();
        assert!(cart.products.contains_key("Widget"));
    }

    #[tokio::test]
    async fn test_add_remove_restores_total() {
        let (_, engine) = engine_with(json!({
            "Pen": {"price": "$0.10", "inventoryCount": 5},
            "Ink": {"price": "$0.20", "inventoryCount": 5},
            "Pad": {"price": "$3.33", "inventoryCount": 5},
        }));
        let mut cart = engine.create_cart();
        engine.add_to_cart(&mut cart, "Pen").await.unwrap();
        engine.add_to_cart(&mut cart, "Ink").await.unwrap();
        let before = cart.total;

        engine.add_to_cart(&mut cart, "Pad").await.unwrap();
        assert_eq!(cart.total.to_string(), "$3.63");

        engine.remove_from_cart(&mut cart, "Pad").unwrap();
        assert_eq!(cart.total, before);
        assert_eq!(cart.total.to_string(), "$0.30");

        engine.remove_from_cart(&mut cart, "Pen").unwrap();
        engine.remove_from_cart(&mut cart, "Ink").unwrap();
        assert_eq!(cart.total.to_string(), "$0.00");
    }

    #[tokio::test]
    async fn test_remove_missing_line() {
        let (_, engine) = engine_with(widget_catalog());
        let mut cart = engine.create_cart();

        let err = engine.remove_from_cart(&mut cart, "Widget").unwrap_err();
        assert!(matches!(err, RemoveError::NotInCart(_)));
        assert_eq!(cart, Cart::new());
    }

    #[tokio::test]
    async fn test_partial_checkout_keeps_earlier_purchases() {
        let (store, engine) = engine_with(json!({
            "Apple": {"price": "$1.00", "inventoryCount": 3},
            "Banana": {"price": "$2.00", "inventoryCount": 1},
            "Cherry": {"price": "$3.00", "inventoryCount": 4},
        }));
        let mut cart = engine.create_cart();
        for title in ["Apple", "Banana", "Cherry"] {
            engine.add_to_cart(&mut cart, title).await.unwrap();
        }

        // Banana sells out between add and checkout
        engine.catalog().purchase("Banana").await.unwrap();

        let err = engine.checkout(&cart).await.unwrap_err();
        match err {
            CheckoutError::PurchaseFailed { title, purchased, reason } => {
                assert_eq!(title, "Banana");
                assert_eq!(purchased, vec!["Apple".to_string()]);
                assert!(matches!(reason, PurchaseError::OutOfStock(_)));
            }
            other => panic!("unexpected checkout error: {}", other),
        }

        assert_eq!(inventory_of(&store, "Apple").await, 2);
        assert_eq!(inventory_of(&store, "Banana").await, 0);
        assert_eq!(inventory_of(&store, "Cherry").await, 4);
    }

    #[tokio::test]
    async fn test_checkout_of_vanished_product() {
        let (store, engine) = engine_with(widget_catalog());
        let mut cart = engine.create_cart();
        engine.add_to_cart(&mut cart, "Widget").await.unwrap();

        store.put(DEFAULT_DOCUMENT_KEY, &json!({})).await.unwrap();

        let err = engine.checkout(&cart).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::PurchaseFailed { reason: PurchaseError::NotFound(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_total_near_limit_is_rejected_not_panicked() {
        let (_, engine) = engine_with(widget_catalog());
        let mut cart: Cart = serde_json::from_value(json!({
            "products": {},
            "total": "$79228162514264337593543950335",
        }))
        .unwrap();
        let before = cart.clone();

        let err = engine.add_to_cart(&mut cart, "Widget").await.unwrap_err();
        assert!(matches!(err, AddError::InvalidCart(CartTotalError::Mismatch { .. })));
        assert_eq!(cart, before);

        let mut huge: Cart = serde_json::from_value(json!({
            "products": {"Yacht": {"price": "$79228162514264337593543950335"}},
            "total": "$79228162514264337593543950335",
        }))
        .unwrap();
        let err = engine.add_to_cart(&mut huge, "Widget").await.unwrap_err();
        assert!(matches!(err, AddError::InvalidCart(CartTotalError::Overflow)));
        assert!(!huge.contains("Widget"));
    }

    #[tokio::test]
    async fn test_inconsistent_cart_is_rejected() {
        let (store, engine) = engine_with(widget_catalog());
        let mut cart: Cart = serde_json::from_value(json!({
            "products": {"Widget": {"price": "$10.00"}},
            "total": "$0.00",
        }))
        .unwrap();

        // Removing would otherwise leave a total of -$10.00
        let err = engine.remove_from_cart(&mut cart, "Widget").unwrap_err();
        assert!(matches!(err, RemoveError::InvalidCart(_)));
        assert!(cart.contains("Widget"));

        let err = engine.checkout(&cart).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidCart(_)));
        assert_eq!(inventory_of(&store, "Widget").await, 2);
    }

    #[tokio::test]
    async fn test_empty_cart_checks_out() {
        let (_, engine) = engine_with(widget_catalog());
        engine.checkout(&engine.create_cart()).await.unwrap();
    }

    #[tokio::test]
    async fn test_queries() {
        let (_, engine) = engine_with(json!({
            "Blue Widget": {"price": "$5.00", "inventoryCount": 1},
            "Red Widget": {"price": "$10.00", "inventoryCount": 0},
            "Gadget": {"price": "$15.00", "inventoryCount": 2},
        }));

        let by_title = engine.query_by_title("widget", false).await.unwrap();
        assert_eq!(by_title.len(), 2);
        let in_stock = engine.query_by_title("widget", true).await.unwrap();
        assert_eq!(in_stock.keys().collect::<Vec<_>>(), vec!["Blue Widget"]);

        let below = engine.query_by_price(dec!(10), "below", false).await.unwrap();
        assert_eq!(below.len(), 2);
        let exact = engine.query_by_price(dec!(15), "exact", true).await.unwrap();
        assert_eq!(exact.keys().collect::<Vec<_>>(), vec!["Gadget"]);

        let err = engine.query_by_price(dec!(10), "cheap", false).await.unwrap_err();
        assert!(matches!(err, QueryError::Validation(_)));
    }
}
