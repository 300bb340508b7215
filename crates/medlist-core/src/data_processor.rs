use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::ExtractionSettings;
use crate::error::{Error, Result};
use crate::extract::{extract, ExtractionOutcome, MarkerSpec};
use crate::traits::LeafletSource;
use crate::types::{ProductDocument, ProductRecord};

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub total: usize,
    pub eligible: usize,
    pub extracted: usize,
    pub not_found: usize,
    pub invalid_reference: usize,
    pub fetch_failures: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub markers: MarkerSpec,
    pub human_kind: String,
    pub include_non_human: bool,
}

impl From<&ExtractionSettings> for PipelineConfig {
    fn from(settings: &ExtractionSettings) -> Self {
        Self {
            markers: settings.markers(),
            human_kind: settings.human_kind.clone(),
            include_non_human: settings.include_non_human,
        }
    }
}

/// True only for absolute `http://` or `https://` addresses.
pub fn is_valid_reference(url: &str) -> bool {
    let url = url.trim();
    ["http://", "https://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.get(..scheme.len()).is_some_and(|p| p.eq_ignore_ascii_case(scheme)))
}

/// Enriches register records with the leaflet fragment.
pub struct DataProcessor {
    config: PipelineConfig,
    show_progress: bool,
}

impl DataProcessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config, show_progress: false }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Runs extraction for every eligible record. Per-product failures leave
    /// the description empty and never stop the run.
    pub fn process<S: LeafletSource>(
        &self,
        records: &[ProductRecord],
        source: &S,
    ) -> Result<(Vec<ProductDocument>, PipelineSummary)> {
        if !self.config.markers.is_usable() {
            return Err(Error::InvalidConfig("extraction markers must not be empty".into()));
        }
        let mut summary = PipelineSummary { total: records.len(), ..Default::default() };
        let eligible: Vec<&ProductRecord> =
            records.iter().filter(|r| r.is_kind(&self.config.human_kind)).collect();
        summary.eligible = eligible.len();
        info!(total = summary.total, eligible = summary.eligible, kind = %self.config.human_kind, "loaded register records");

        let pb = self.progress_bar(records.len() as u64);
        let mut documents = Vec::with_capacity(if self.config.include_non_human { records.len() } else { eligible.len() });
        for record in records {
            pb.inc(1);
            let usage_text = if record.is_kind(&self.config.human_kind) {
                self.usage_text(record, source, &mut summary)
            } else if self.config.include_non_human {
                String::new()
            } else {
                continue;
            };
            documents.push(ProductDocument::from_record(record, usage_text));
        }
        pb.finish_and_clear();

        info!(
            extracted = summary.extracted,
            not_found = summary.not_found,
            invalid_reference = summary.invalid_reference,
            fetch_failures = summary.fetch_failures,
            "leaflet extraction finished"
        );
        Ok((documents, summary))
    }

    fn usage_text<S: LeafletSource>(&self, record: &ProductRecord, source: &S, summary: &mut PipelineSummary) -> String {
        if !is_valid_reference(&record.leaflet_url) {
            summary.invalid_reference += 1;
            debug!(id = %record.id, title = %record.title, "skipping, no valid leaflet reference");
            return String::new();
        }
        let text = match source.fetch_text(&record.leaflet_url) {
            Ok(text) => text,
            Err(e) => {
                summary.fetch_failures += 1;
                warn!(id = %record.id, url = %record.leaflet_url, error = %e, "leaflet fetch failed");
                return String::new();
            }
        };
        match extract(&text, &self.config.markers) {
            ExtractionOutcome::Found(fragment) => {
                summary.extracted += 1;
                debug!(id = %record.id, chars = fragment.chars().count(), "fragment extracted");
                fragment
            }
            ExtractionOutcome::NotFound => {
                summary.not_found += 1;
                debug!(id = %record.id, title = %record.title, "no fragment in leaflet");
                String::new()
            }
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} products ({percent}%)")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_reference;

    #[test]
    fn references() {
        assert!(is_valid_reference("https://rejestrymedyczne.ezdrowie.gov.pl/api/rpl/medicinal-products/15260/leaflet"));
        assert!(is_valid_reference("HTTP://example.org/x.pdf"));
        assert!(!is_valid_reference(""));
        assert!(!is_valid_reference("https://"));
        assert!(!is_valid_reference("ftp://example.org/x.pdf"));
        assert!(!is_valid_reference("httpx"));
    }
}
