use reqwest::blocking::Client;
use std::fs;
use std::panic;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use medlist_core::config::FetchSettings;
use medlist_core::data_processor::is_valid_reference;
use medlist_core::traits::LeafletSource;
use medlist_core::{Error, FetchFailure, ProductRecord, Result};

/// Which of the two documents linked from a register entry to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Leaflet,
    Characteristics,
}

impl DocumentKind {
    pub fn url<'a>(&self, record: &'a ProductRecord) -> &'a str {
        match self {
            DocumentKind::Leaflet => &record.leaflet_url,
            DocumentKind::Characteristics => &record.spec_url,
        }
    }

    pub fn file_name(&self, id: &str) -> String {
        match self {
            DocumentKind::Leaflet => format!("ulotka_{id}.pdf"),
            DocumentKind::Characteristics => format!("charakterystyka_{id}.pdf"),
        }
    }
}

/// Blocking HTTP client for leaflet PDFs.
#[derive(Debug, Clone)]
pub struct HttpLeafletFetcher {
    client: Client,
}

impl HttpLeafletFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    pub fn fetch_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, FetchFailure> {
        let response = self.client.get(url).send().map_err(|e| FetchFailure::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }
        let bytes = response.bytes().map_err(|e| FetchFailure::Transport(e.to_string()))?;
        debug!(url, bytes = bytes.len(), "document fetched");
        Ok(bytes.to_vec())
    }

    /// Saves the document behind `url` as `dest_dir/file_name`.
    pub fn download(&self, url: &str, dest_dir: &Path, file_name: &str) -> Result<PathBuf> {
        if !is_valid_reference(url) {
            return Err(Error::InvalidReference(format!("{url:?} is not an http(s) address")));
        }
        let bytes = self.fetch_bytes(url)?;
        fs::create_dir_all(dest_dir)?;
        let path = dest_dir.join(file_name);
        fs::write(&path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "document saved");
        Ok(path)
    }
}

impl LeafletSource for HttpLeafletFetcher {
    fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        let bytes = self.fetch_bytes(url)?;
        pdf_text(&bytes)
    }
}

/// Text of every page of a PDF, in page order.
///
/// The PDF library panics on some malformed files; that is reported as
/// `Unreadable` like any other parse failure.
pub fn pdf_text(bytes: &[u8]) -> std::result::Result<String, FetchFailure> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(FetchFailure::Unreadable(e.to_string())),
        Err(_) => Err(FetchFailure::Unreadable("PDF parser panicked".into())),
    }
}
