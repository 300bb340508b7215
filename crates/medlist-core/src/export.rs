//! `;`-delimited export of product documents.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::ProductDocument;

pub const EXPORT_HEADER: [&str; 4] = ["id", "nazwaProduktu", "nazwaPowszechnieStosowana", "opis"];
pub const EXPORT_DELIMITER: u8 = b';';

#[derive(Debug, Serialize, Deserialize)]
struct ExportRow {
    id: String,
    #[serde(rename = "nazwaProduktu")]
    title: String,
    #[serde(rename = "nazwaPowszechnieStosowana")]
    common_name: String,
    #[serde(rename = "opis")]
    usage_text: String,
}

impl From<&ProductDocument> for ExportRow {
    fn from(doc: &ProductDocument) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            common_name: doc.common_name.clone(),
            usage_text: doc.usage_text.clone(),
        }
    }
}

impl From<ExportRow> for ProductDocument {
    fn from(row: ExportRow) -> Self {
        Self { id: row.id, title: row.title, common_name: row.common_name, usage_text: row.usage_text }
    }
}

/// Rows read back from an export file, plus the line numbers of rows that
/// were skipped as malformed.
#[derive(Debug, Default)]
pub struct ExportContents {
    pub documents: Vec<ProductDocument>,
    pub rejected_lines: Vec<u64>,
}

pub fn write_export(path: &Path, documents: &[ProductDocument]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(EXPORT_DELIMITER)
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    let write_err = |e: csv::Error| Error::Io(std::io::Error::other(e));
    writer.write_record(EXPORT_HEADER).map_err(write_err)?;
    for doc in documents {
        writer.serialize(ExportRow::from(doc)).map_err(write_err)?;
    }
    writer.flush()?;
    info!(rows = documents.len(), path = %path.display(), "export written");
    Ok(())
}

/// Reads an export file. An unreadable file or an unexpected header aborts;
/// a malformed row is skipped.
pub fn read_export(path: &Path) -> Result<ExportContents> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(EXPORT_DELIMITER)
        .from_path(path)
        .map_err(|e| Error::BuildFatal(format!("cannot read {}: {}", path.display(), e)))?;
    let headers = reader
        .headers()
        .map_err(|e| Error::BuildFatal(format!("cannot read header of {}: {}", path.display(), e)))?;
    if headers.iter().ne(EXPORT_HEADER) {
        return Err(Error::BuildFatal(format!("unexpected header in {}: {:?}", path.display(), headers)));
    }

    let mut contents = ExportContents::default();
    for result in reader.deserialize::<ExportRow>() {
        match result {
            Ok(row) => contents.documents.push(row.into()),
            Err(e) if e.is_io_error() => {
                return Err(Error::BuildFatal(format!("reading {} failed: {}", path.display(), e)));
            }
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                warn!(line, error = %e, "skipping malformed export row");
                contents.rejected_lines.push(line);
            }
        }
    }
    info!(rows = contents.documents.len(), rejected = contents.rejected_lines.len(), path = %path.display(), "export loaded");
    Ok(contents)
}
