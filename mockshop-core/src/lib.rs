pub mod repository;

pub use repository::{CasOutcome, DocumentStore, StoreError, Version, Versioned};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
