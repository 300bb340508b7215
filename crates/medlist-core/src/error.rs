use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Leaflet or characteristics URL is missing or not an HTTP(S) address.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Unreadable source data or an index destination that cannot be written.
    /// Aborts the whole build.
    #[error("Index build aborted: {0}")]
    BuildFatal(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchFailure),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a leaflet could not be turned into text. Always degrades to an empty
/// description for the affected product.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error("unreadable document: {0}")]
    Unreadable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
