use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque version token of a stored document. Only equality is meaningful.
pub type Version = u64;

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: Version,
    pub value: T,
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The write landed; the document now has this version.
    Swapped(Version),
    /// Someone else wrote first. `current` is `None` when the document is gone.
    Conflict { current: Option<Version> },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored document {key} is not valid JSON: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid document key: {0:?}")]
    InvalidKey(String),
}

/// Key-value document storage for whole JSON documents.
///
/// Documents are read and written in full. `compare_and_swap` is the only
/// primitive that is safe against concurrent writers; `put` is last-writer-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Versioned<Value>>, StoreError>;

    async fn put(&self, key: &str, value: &Value) -> Result<Version, StoreError>;

    /// Write `value` only if the stored version still equals `expected`.
    /// `expected == None` means "only if the document does not exist yet".
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &Value,
    ) -> Result<CasOutcome, StoreError>;
}
