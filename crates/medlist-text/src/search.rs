use std::cmp::Ordering;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::{QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument, Term};

use medlist_core::traits::DocumentIndex;
use medlist_core::{Error, ProductDocument, Result, SearchHit, StemLanguage};

use crate::tantivy_utils::{register_tokenizer, IndexMeta, ProductFields};

/// Read side of a committed index. Each query takes a fresh searcher, so one
/// engine can serve concurrent readers.
pub struct TantivySearchEngine {
    index: Index,
    reader: IndexReader,
    fields: ProductFields,
    language: StemLanguage,
}

impl TantivySearchEngine {
    pub fn new(index_dir: &Path) -> Result<Self> {
        if !index_dir.is_dir() {
            return Err(Error::NotFound(format!("no index at {}", index_dir.display())));
        }
        let meta = IndexMeta::read(index_dir)?;
        let index = Index::open_in_dir(index_dir).map_err(index_err)?;
        register_tokenizer(&index, meta.language);
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(index_err)?;
        let fields = ProductFields::from_schema(&index.schema()).map_err(index_err)?;
        Ok(Self { index, reader, fields, language: meta.language })
    }

    pub fn language(&self) -> StemLanguage {
        self.language
    }

    fn stored(&self, doc: &TantivyDocument) -> ProductDocument {
        let text = |field: Field| doc.get_first(field).and_then(|v| v.as_str()).unwrap_or_default().to_string();
        ProductDocument {
            id: text(self.fields.id),
            title: text(self.fields.title),
            common_name: text(self.fields.common_name),
            usage_text: text(self.fields.usage_text),
        }
    }
}

impl DocumentIndex for TantivySearchEngine {
    fn search(&self, query_text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query_parser = QueryParser::for_index(&self.index, self.fields.text_fields());
        let query = query_parser
            .parse_query(query_text)
            .map_err(|e| Error::InvalidQuery(format!("{query_text}: {e}")))?;
        let searcher = self.reader.searcher();

        // TopDocs breaks score ties by doc address, so keep widening the window
        // until it ends below the score of the last kept hit or runs out of
        // matches.
        let mut window = limit.saturating_add(1);
        let top_docs = loop {
            let top_docs = searcher.search(&query, &TopDocs::with_limit(window)).map_err(index_err)?;
            let tie_cut = top_docs.len() == window && top_docs[limit - 1].0 == top_docs[window - 1].0;
            if !tie_cut {
                break top_docs;
            }
            window = window.saturating_mul(2);
        };

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address).map_err(index_err)?;
            hits.push(SearchHit { document: self.stored(&doc), score });
        }
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    fn get(&self, id: &str) -> Result<Option<ProductDocument>> {
        let query = TermQuery::new(Term::from_field_text(self.fields.id, id), IndexRecordOption::Basic);
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(1)).map_err(index_err)?;
        match top_docs.first() {
            Some((_, doc_address)) => {
                let doc: TantivyDocument = searcher.doc(*doc_address).map_err(index_err)?;
                Ok(Some(self.stored(&doc)))
            }
            None => Ok(None),
        }
    }

    fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

fn index_err(e: tantivy::TantivyError) -> Error {
    Error::Index(e.to_string())
}
