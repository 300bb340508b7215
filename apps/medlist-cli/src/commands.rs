use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use medlist_core::builder::BuildReport;
use medlist_core::config::Settings;
use medlist_core::data_processor::{DataProcessor, PipelineConfig, PipelineSummary};
use medlist_core::export::{read_export, write_export};
use medlist_core::{IndexBuilder, ProductRecord, QueryEngine};
use medlist_leaflet::{DocumentKind, HttpLeafletFetcher};
use medlist_registry::RegistryParser;
use medlist_text::{TantivyIndexer, TantivySearchEngine};

/// Register → leaflet extraction → export file.
pub fn export(settings: &Settings, show_progress: bool) -> Result<PipelineSummary> {
    let registry_path = &settings.data.registry_xml;
    let registry = RegistryParser::from_path(registry_path)
        .with_context(|| format!("loading register {}", registry_path.display()))?;
    let fetcher = HttpLeafletFetcher::new(&settings.fetch)?;
    let processor = DataProcessor::new(PipelineConfig::from(&settings.extraction)).with_progress(show_progress);
    let (documents, summary) = processor.process(registry.products(), &fetcher)?;

    write_export(&settings.data.export_csv, &documents)
        .with_context(|| format!("writing {}", settings.data.export_csv.display()))?;
    info!(rows = documents.len(), path = %settings.data.export_csv.display(), "export finished");
    Ok(summary)
}

/// Export file → fresh index, replacing whatever was there.
pub fn index(settings: &Settings) -> Result<BuildReport> {
    let contents = read_export(&settings.data.export_csv)?;
    if !contents.rejected_lines.is_empty() {
        warn!(lines = ?contents.rejected_lines, "malformed export rows were skipped");
    }
    let indexer = TantivyIndexer::new(&settings.data.index_dir, settings.index.language)
        .with_writer_memory(settings.index.writer_memory_bytes);
    let report = IndexBuilder::new(indexer).build(contents.documents)?;
    Ok(report)
}

pub fn build(settings: &Settings, show_progress: bool) -> Result<(PipelineSummary, BuildReport)> {
    let summary = export(settings, show_progress)?;
    let report = index(settings)?;
    Ok((summary, report))
}

pub fn open_engine(settings: &Settings) -> Result<QueryEngine<TantivySearchEngine>> {
    let engine = TantivySearchEngine::new(&settings.data.index_dir)
        .with_context(|| "the index has not been built yet, run `medlist build` first")?;
    Ok(QueryEngine::new(engine))
}

pub fn load_registry(settings: &Settings) -> Result<RegistryParser> {
    let path = &settings.data.registry_xml;
    RegistryParser::from_path(path).with_context(|| format!("loading register {}", path.display()))
}

pub fn find_product<'a>(registry: &'a RegistryParser, id: &str) -> Result<&'a ProductRecord> {
    registry.find(id).ok_or_else(|| anyhow!("no product with id {id} in the register"))
}

/// Downloads the leaflet or characteristics PDF of a product into the
/// downloads directory.
pub fn download(settings: &Settings, record: &ProductRecord, kind: DocumentKind) -> Result<PathBuf> {
    let fetcher = HttpLeafletFetcher::new(&settings.fetch)?;
    let path = fetcher
        .download(kind.url(record), &settings.data.downloads_dir, &kind.file_name(&record.id))
        .with_context(|| format!("downloading {kind:?} of product {}", record.id))?;
    Ok(path)
}
