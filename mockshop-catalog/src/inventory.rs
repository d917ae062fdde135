use crate::catalog::CatalogError;
use crate::product::ProductMap;
use crate::search::resolve_title;

/// Take one unit of `title` out of stock. Returns the stored title.
pub fn decrement(products: &mut ProductMap, title: &str) -> Result<String, PurchaseError> {
    let canonical = resolve_title(products, title)
        .ok_or_else(|| PurchaseError::NotFound(title.to_string()))?
        .to_string();

    let record = products
        .get_mut(&canonical)
        .ok_or_else(|| PurchaseError::NotFound(title.to_string()))?;

    if record.inventory_count < 1 {
        return Err(PurchaseError::OutOfStock(canonical));
    }

    record.inventory_count -= 1;
    Ok(canonical)
}

#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Product out of stock: {0}")]
    OutOfStock(String),

    #[error("Gave up purchasing {title} after {attempts} conflicting writes")]
    Contention {
        title: String,
        attempts: u32,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
