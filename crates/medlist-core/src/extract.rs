//! Marker-delimited fragment extraction.
//!
//! A fragment is the text strictly between an occurrence of a start marker and
//! the first end marker after it. Candidates shorter than the requested minimum
//! are skipped by moving the cursor past the start marker and searching again.

use serde::{Deserialize, Serialize};

/// Boundary markers and the minimum untrimmed fragment length, in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub start: String,
    pub end: String,
    pub min_length: usize,
}

impl MarkerSpec {
    pub fn new(start: impl Into<String>, end: impl Into<String>, min_length: usize) -> Self {
        Self { start: start.into(), end: end.into(), min_length }
    }

    /// Both markers must be non-empty before extraction is attempted.
    pub fn is_usable(&self) -> bool {
        !self.start.is_empty() && !self.end.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Found(String),
    NotFound,
}

impl ExtractionOutcome {
    pub fn into_option(self) -> Option<String> {
        match self {
            Self::Found(fragment) => Some(fragment),
            Self::NotFound => None,
        }
    }
}

/// One start/end pairing visited by the search. Indices are byte offsets
/// into the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub start_index: usize,
    pub end_index: usize,
    pub body: &'a str,
}

impl Candidate<'_> {
    /// Untrimmed body length in characters.
    pub fn len(&self) -> usize {
        self.body.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Iterator over the successive candidates of a marker search.
///
/// Stops for good as soon as either marker can no longer be found from the
/// cursor. The cursor only moves forward, past the last start marker.
#[derive(Debug, Clone)]
pub struct Candidates<'a> {
    text: &'a str,
    start: &'a str,
    end: &'a str,
    cursor: Option<usize>,
}

impl<'a> Iterator for Candidates<'a> {
    type Item = Candidate<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.take()?;
        let start_index = cursor + self.text[cursor..].find(self.start)?;
        let body_start = start_index + self.start.len();
        let end_index = body_start + self.text[body_start..].find(self.end)?;
        self.cursor = Some(body_start);
        Some(Candidate { start_index, end_index, body: &self.text[body_start..end_index] })
    }
}

/// All candidates of `spec` in `text`, in search order. Empty markers yield
/// nothing.
pub fn candidates<'a>(text: &'a str, spec: &'a MarkerSpec) -> Candidates<'a> {
    let cursor = spec.is_usable().then_some(0);
    Candidates { text, start: &spec.start, end: &spec.end, cursor }
}

/// Returns the first candidate at least `spec.min_length` characters long,
/// trimmed of surrounding whitespace.
pub fn extract(text: &str, spec: &MarkerSpec) -> ExtractionOutcome {
    candidates(text, spec)
        .find(|candidate| candidate.len() >= spec.min_length)
        .map_or(ExtractionOutcome::NotFound, |candidate| {
            ExtractionOutcome::Found(candidate.body.trim().to_string())
        })
}
