//! Terminal rendering of search hits and product details.

use serde::Serialize;

use medlist_core::{ProductRecord, SearchHit};

pub const NO_RESULTS: &str = "No results.";
const HEADER: [&str; 4] = ["ID", "Nazwa", "Nazwa powsz.", "Score"];

#[derive(Debug, Serialize)]
pub struct HitView<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub common_name: &'a str,
    pub usage_text: &'a str,
    pub score: f32,
}

impl<'a> From<&'a SearchHit> for HitView<'a> {
    fn from(hit: &'a SearchHit) -> Self {
        Self {
            id: &hit.document.id,
            title: &hit.document.title,
            common_name: &hit.document.common_name,
            usage_text: &hit.document.usage_text,
            score: hit.score,
        }
    }
}

pub fn hits_json(hits: &[SearchHit]) -> serde_json::Result<String> {
    let views: Vec<HitView<'_>> = hits.iter().map(HitView::from).collect();
    serde_json::to_string_pretty(&views)
}

/// One row per hit: id, title, common name and the score with four decimals.
pub fn hits_table(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    let rows: Vec<[String; 4]> = hits
        .iter()
        .map(|h| {
            [h.document.id.clone(), h.document.title.clone(), h.document.common_name.clone(), format!("{:.4}", h.score)]
        })
        .collect();

    let mut widths = HEADER.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADER.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells.iter().zip(widths).map(|(cell, w)| format!("{cell:<width$}", width = *w)).collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}

/// Trimmed description without its last line when it has several. The end
/// marker cuts the leaflet mid-heading, so the last line is a dangling
/// section title.
pub fn display_description(usage_text: &str) -> String {
    let trimmed = usage_text.trim();
    match trimmed.rsplit_once('\n') {
        Some((head, _)) => head.trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

pub fn product_details(record: &ProductRecord) -> String {
    record
        .details()
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
