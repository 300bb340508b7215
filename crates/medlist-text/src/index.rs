use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tantivy::{doc, Index, IndexWriter, TantivyDocument, Term};
use tracing::{debug, info};

use medlist_core::traits::{IndexSink, IndexStore};
use medlist_core::{Error, ProductDocument, Result, StemLanguage};

use crate::tantivy_utils::{build_schema, register_tokenizer, IndexMeta, ProductFields};

/// Index location plus the settings every build at that location uses.
///
/// Each build is written to a sibling `<index_dir>.building` directory and
/// only moved over `index_dir` after its commit succeeded.
#[derive(Debug, Clone)]
pub struct TantivyIndexer {
    index_dir: PathBuf,
    language: StemLanguage,
    writer_memory_bytes: usize,
}

impl TantivyIndexer {
    pub fn new(index_dir: impl Into<PathBuf>, language: StemLanguage) -> Self {
        Self { index_dir: index_dir.into(), language, writer_memory_bytes: 50_000_000 }
    }

    pub fn with_writer_memory(mut self, bytes: usize) -> Self {
        self.writer_memory_bytes = bytes;
        self
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    fn staging_dir(&self) -> Result<PathBuf> {
        let name = self
            .index_dir
            .file_name()
            .ok_or_else(|| Error::BuildFatal(format!("{} is not a usable index directory", self.index_dir.display())))?;
        let mut staging: OsString = name.to_os_string();
        staging.push(".building");
        Ok(self.index_dir.with_file_name(staging))
    }
}

impl IndexStore for TantivyIndexer {
    type Sink = TantivyIndexWriter;

    fn create(&self) -> Result<TantivyIndexWriter> {
        let staging_dir = self.staging_dir()?;
        if staging_dir.exists() {
            fs::remove_dir_all(&staging_dir).map_err(|e| fatal_io(&staging_dir, e))?;
        }
        fs::create_dir_all(&staging_dir).map_err(|e| fatal_io(&staging_dir, e))?;

        let schema = build_schema();
        let index = Index::create_in_dir(&staging_dir, schema.clone()).map_err(fatal)?;
        register_tokenizer(&index, self.language);
        IndexMeta { language: self.language }.write(&staging_dir)?;
        // One indexing thread keeps documents in input order.
        let writer = index.writer_with_num_threads(1, self.writer_memory_bytes).map_err(fatal)?;
        let fields = ProductFields::from_schema(&schema).map_err(fatal)?;
        debug!(staging = %staging_dir.display(), language = %self.language, "index created");
        Ok(TantivyIndexWriter { index, writer, fields, staging_dir, index_dir: self.index_dir.clone(), added: 0 })
    }
}

pub struct TantivyIndexWriter {
    index: Index,
    writer: IndexWriter,
    fields: ProductFields,
    staging_dir: PathBuf,
    index_dir: PathBuf,
    added: u64,
}

impl TantivyIndexWriter {
    fn to_tantivy(&self, d: &ProductDocument) -> TantivyDocument {
        doc!(
            self.fields.id => d.id.clone(),
            self.fields.title => d.title.clone(),
            self.fields.common_name => d.common_name.clone(),
            self.fields.usage_text => d.usage_text.clone(),
        )
    }
}

impl IndexSink for TantivyIndexWriter {
    fn add_document(&mut self, d: &ProductDocument) -> Result<()> {
        let doc = self.to_tantivy(d);
        self.writer.add_document(doc).map_err(fatal)?;
        self.added += 1;
        Ok(())
    }

    fn replace_document(&mut self, d: &ProductDocument) -> Result<()> {
        // Deletes only affect documents added before this operation.
        self.writer.delete_term(Term::from_field_text(self.fields.id, &d.id));
        self.add_document(d)
    }

    fn commit(self) -> Result<()> {
        let Self { index, mut writer, staging_dir, index_dir, added, .. } = self;
        writer.commit().map_err(fatal)?;
        writer.wait_merging_threads().map_err(fatal)?;
        drop(index);

        if index_dir.exists() {
            fs::remove_dir_all(&index_dir).map_err(|e| fatal_io(&index_dir, e))?;
        }
        fs::rename(&staging_dir, &index_dir).map_err(|e| fatal_io(&index_dir, e))?;
        info!(index = %index_dir.display(), operations = added, "index replaced");
        Ok(())
    }
}

fn fatal(e: tantivy::TantivyError) -> Error {
    Error::BuildFatal(e.to_string())
}

fn fatal_io(path: &Path, e: std::io::Error) -> Error {
    Error::BuildFatal(format!("{}: {}", path.display(), e))
}
