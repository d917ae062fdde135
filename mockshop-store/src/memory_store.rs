use async_trait::async_trait;
use mockshop_core::repository::{CasOutcome, DocumentStore, StoreError, Version, Versioned};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-process document store. Versions are a per-key write counter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Versioned<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-loaded with documents, each at version 1.
    pub fn with_documents<I, K>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let documents = documents
            .into_iter()
            .map(|(key, value)| (key.into(), Versioned { version: 1, value }))
            .collect();

        Self {
            documents: Mutex::new(documents),
        }
    }
}

fn next_version(current: Option<&Versioned<Value>>) -> Version {
    current.map_or(1, |doc| doc.version + 1)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned<Value>>, StoreError> {
        let documents = self.documents.lock().await;
        Ok(documents.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &Value) -> Result<Version, StoreError> {
        let mut documents = self.documents.lock().await;
        let version = next_version(documents.get(key));
        documents.insert(
            key.to_string(),
            Versioned {
                version,
                value: value.clone(),
            },
        );
        debug!("Stored document {} at version {}", key, version);
        Ok(version)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &Value,
    ) -> Result<CasOutcome, StoreError> {
        let mut documents = self.documents.lock().await;
        let current = documents.get(key).map(|doc| doc.version);

        if current != expected {
            debug!("CAS conflict on {}: expected {:?}, found {:?}", key, expected, current);
            return Ok(CasOutcome::Conflict { current });
        }

        let version = next_version(documents.get(key));
        documents.insert(
            key.to_string(),
            Versioned {
                version,
                value: value.clone(),
            },
        );
        Ok(CasOutcome::Swapped(version))
    }
}
