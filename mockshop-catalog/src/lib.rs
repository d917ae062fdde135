pub mod catalog;
pub mod inventory;
pub mod product;
pub mod search;

pub use catalog::{Catalog, CatalogError, DEFAULT_DOCUMENT_KEY, DEFAULT_PURCHASE_ATTEMPTS};
pub use inventory::PurchaseError;
pub use product::{PriceComparator, ProductMap, ProductRecord};
