//! medlist-core
//!
//! Domain types, error taxonomy, configuration, leaflet fragment extraction
//! and the engine-independent build/query policy. Storage engines implement
//! the traits in `traits`; see `medlist-text` for the tantivy one.

pub mod builder;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod export;
pub mod extract;
pub mod query;
pub mod traits;
pub mod types;

pub use builder::{BuildReport, IndexBuilder, RejectedDocument};
pub use error::{Error, FetchFailure, Result};
pub use extract::{extract, ExtractionOutcome, MarkerSpec};
pub use query::QueryEngine;
pub use types::{ProductDocument, ProductRecord, SearchHit, SortMode, StemLanguage};
