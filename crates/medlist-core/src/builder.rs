//! Destructive index builds over any [`IndexStore`].

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::traits::{IndexSink, IndexStore};
use crate::types::{ProductDocument, ProductId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDocument {
    pub position: usize,
    pub id: ProductId,
    pub reason: String,
}

/// Outcome of one build. `added` counts distinct ids present after commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub added: usize,
    pub replaced: usize,
    pub rejected: Vec<RejectedDocument>,
}

pub struct IndexBuilder<S: IndexStore> {
    store: S,
}

impl<S: IndexStore> IndexBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an empty index, adds `documents` in order and commits once.
    ///
    /// A repeated id replaces the earlier document. Documents with a malformed
    /// id are rejected individually. Store errors abort the build before
    /// commit.
    pub fn build<I>(&self, documents: I) -> Result<BuildReport>
    where
        I: IntoIterator<Item = ProductDocument>,
    {
        let mut sink = self.store.create()?;
        let mut seen: HashSet<ProductId> = HashSet::new();
        let mut report = BuildReport::default();

        for (position, doc) in documents.into_iter().enumerate() {
            if let Some(reason) = id_defect(&doc.id) {
                warn!(position, id = %doc.id, reason, "rejecting document");
                report.rejected.push(RejectedDocument { position, id: doc.id, reason: reason.to_string() });
                continue;
            }
            if seen.contains(&doc.id) {
                warn!(id = %doc.id, "duplicate id, replacing earlier document");
                sink.replace_document(&doc)?;
                report.replaced += 1;
            } else {
                debug!(id = %doc.id, "adding document");
                sink.add_document(&doc)?;
                seen.insert(doc.id);
            }
        }

        sink.commit()?;
        report.added = seen.len();
        info!(added = report.added, replaced = report.replaced, rejected = report.rejected.len(), "index committed");
        Ok(report)
    }
}

fn id_defect(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        Some("empty id")
    } else if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("id contains whitespace or control characters")
    } else {
        None
    }
}
