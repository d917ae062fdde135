use crate::inventory::{self, PurchaseError};
use crate::product::{PriceComparator, ProductMap};
use crate::search;
use mockshop_core::repository::{CasOutcome, DocumentStore, StoreError, Version};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_DOCUMENT_KEY: &str = "products";
pub const DEFAULT_PURCHASE_ATTEMPTS: u32 = 5;

/// The product catalog, backed by a single document in a `DocumentStore`.
///
/// Nothing is cached: every call re-reads the stored document, so edits made
/// to the store between calls are always seen.
pub struct Catalog {
    store: Arc<dyn DocumentStore>,
    document_key: String,
    max_attempts: u32,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>, document_key: impl Into<String>) -> Self {
        Self {
            store,
            document_key: document_key.into(),
            max_attempts: DEFAULT_PURCHASE_ATTEMPTS,
        }
    }

    /// Number of read-modify-write attempts a purchase makes before giving up.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    async fn load(&self) -> Result<(Option<Version>, ProductMap), CatalogError> {
        let Some(doc) = self.store.get(&self.document_key).await? else {
            debug!("Catalog document {} missing, treating as empty", self.document_key);
            return Ok((None, ProductMap::new()));
        };

        let products = serde_json::from_value(doc.value).map_err(|source| CatalogError::Malformed {
            key: self.document_key.clone(),
            source,
        })?;
        Ok((Some(doc.version), products))
    }

    /// The whole catalog as currently stored.
    pub async fn snapshot(&self) -> Result<ProductMap, CatalogError> {
        Ok(self.load().await?.1)
    }

    /// Look up products by title, ignoring case.
    ///
    /// With `exact_match` the result holds at most the one product whose title
    /// equals `query`; otherwise every product whose title contains it.
    pub async fn find_by_title(
        &self,
        query: &str,
        exact_match: bool,
        only_in_stock: bool,
    ) -> Result<ProductMap, CatalogError> {
        let (_, products) = self.load().await?;
        let found = search::filter_by_title(products, query, exact_match, only_in_stock);
        debug!("Title query {:?} (exact: {}) matched {} products", query, exact_match, found.len());
        Ok(found)
    }

    pub async fn find_by_price(
        &self,
        query_price: Decimal,
        comparator: PriceComparator,
        only_in_stock: bool,
    ) -> Result<ProductMap, CatalogError> {
        let (_, products) = self.load().await?;
        let found = search::filter_by_price(products, query_price, comparator, only_in_stock);
        debug!("Price query {:?} {} matched {} products", comparator, query_price, found.len());
        Ok(found)
    }

    /// Take one unit of `title` out of stock and persist the catalog.
    ///
    /// The write is conditional on the document being unchanged since it was
    /// read; on conflict the purchase is re-evaluated against fresh state.
    pub async fn purchase(&self, title: &str) -> Result<(), PurchaseError> {
        for attempt in 1..=self.max_attempts {
            let (version, mut products) = self.load().await?;
            let canonical = inventory::decrement(&mut products, title)?;

            let doc = serde_json::to_value(&products).map_err(|source| CatalogError::Malformed {
                key: self.document_key.clone(),
                source,
            })?;

            match self
                .store
                .compare_and_swap(&self.document_key, version, &doc)
                .await
                .map_err(CatalogError::from)?
            {
                CasOutcome::Swapped(_) => {
                    info!(
                        "Purchased {} ({} left)",
                        canonical,
                        products.get(&canonical).map_or(0, |p| p.inventory_count)
                    );
                    return Ok(());
                }
                CasOutcome::Conflict { .. } => {
                    debug!("Catalog changed under purchase of {} (attempt {})", canonical, attempt);
                }
            }
        }

        warn!("Purchase of {} abandoned after {} attempts", title, self.max_attempts);
        Err(PurchaseError::Contention {
            title: title.to_string(),
            attempts: self.max_attempts,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("Catalog document {key} is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
