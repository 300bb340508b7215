use crate::error::{FetchFailure, Result};
use crate::types::{ProductDocument, SearchHit};

/// Turns a leaflet URL into plain text.
pub trait LeafletSource {
    fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchFailure>;
}

/// A persistent index location. `create` always starts from an empty index,
/// discarding whatever the location held before.
pub trait IndexStore {
    type Sink: IndexSink;

    fn create(&self) -> Result<Self::Sink>;
}

/// Write side of a single build. Nothing added is visible to readers until
/// `commit` returns.
pub trait IndexSink {
    fn add_document(&mut self, doc: &ProductDocument) -> Result<()>;

    /// Removes any earlier document with the same id, then adds `doc`.
    fn replace_document(&mut self, doc: &ProductDocument) -> Result<()>;

    fn commit(self) -> Result<()>;
}

/// Read side of a committed index.
pub trait DocumentIndex: Send + Sync {
    /// Parses `query` against the tokenized fields and returns the first
    /// `limit` hits by descending score, equal scores by ascending id.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    fn get(&self, id: &str) -> Result<Option<ProductDocument>>;

    fn num_docs(&self) -> u64;
}
