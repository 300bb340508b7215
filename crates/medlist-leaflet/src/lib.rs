//! Leaflet retrieval: HTTP download and PDF text extraction.

pub mod fetch;

pub use fetch::{pdf_text, DocumentKind, HttpLeafletFetcher};
