//! Result ordering policy on top of a [`DocumentIndex`].

use std::cmp::Ordering;
use tracing::debug;

use crate::error::Result;
use crate::traits::DocumentIndex;
use crate::types::{ProductDocument, SearchHit, SortMode};

pub struct QueryEngine<I: DocumentIndex> {
    index: I,
}

impl<I: DocumentIndex> QueryEngine<I> {
    pub fn new(index: I) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Runs `query_text` and orders the hits.
    ///
    /// An empty query or a zero limit returns no hits without touching the
    /// index. Relevance order breaks score ties by ascending id; alphabetical
    /// order re-sorts the already limited hits by lower-cased title.
    pub fn search(&self, query_text: &str, limit: usize, sort_mode: SortMode) -> Result<Vec<SearchHit>> {
        let query_text = query_text.trim();
        if query_text.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut hits = self.index.search(query_text, limit)?;
        hits.truncate(limit);
        hits.sort_by(by_relevance);
        if sort_mode == SortMode::Alphabetical {
            hits.sort_by_cached_key(|hit| hit.document.title.to_lowercase());
        }
        debug!(query = query_text, hits = hits.len(), ?sort_mode, "search finished");
        Ok(hits)
    }

    pub fn get(&self, id: &str) -> Result<Option<ProductDocument>> {
        self.index.get(id)
    }
}

fn by_relevance(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.document.id.cmp(&b.document.id))
}
