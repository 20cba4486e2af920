// src/outage/extract.rs
//! HTML table extraction for the scheduled-interruption archive page.
//!
//! Page layout the extractor expects:
//!
//! ```text
//! <div id="table-archive">
//!   <table class="table-striped">
//!     <tr> header </tr>
//!     <tr><td>date</td><td><a href="...pdf">..</a> ...</td></tr>
//!     ...
//! ```
//!
//! Missing markers are not errors: the page may simply have no outages listed
//! or may have been redesigned, so the caller gets an empty batch and a warning.

use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::types::{OutageBatch, OutageRecord};

pub const DEFAULT_CONTAINER_SELECTOR: &str = "div#table-archive";
pub const DEFAULT_TABLE_SELECTOR: &str = "table.table-striped";

const PDF_SUFFIX: &str = ".pdf";

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid CSS selector `{selector}`: {reason}")]
pub struct MarkerError {
    pub selector: String,
    pub reason: String,
}

/// Structural markers locating the outage table.
#[derive(Debug, Clone)]
pub struct TableMarkers {
    container_css: String,
    table_css: String,
    container: Selector,
    table: Selector,
}

impl TableMarkers {
    pub fn new(container: &str, table: &str) -> Result<Self, MarkerError> {
        Ok(Self {
            container_css: container.to_string(),
            table_css: table.to_string(),
            container: parse_selector(container)?,
            table: parse_selector(table)?,
        })
    }

    pub fn container_css(&self) -> &str {
        &self.container_css
    }

    pub fn table_css(&self) -> &str {
        &self.table_css
    }
}

impl Default for TableMarkers {
    fn default() -> Self {
        static DEFAULT: Lazy<TableMarkers> = Lazy::new(|| {
            TableMarkers::new(DEFAULT_CONTAINER_SELECTOR, DEFAULT_TABLE_SELECTOR).unwrap()
        });
        DEFAULT.clone()
    }
}

fn parse_selector(css: &str) -> Result<Selector, MarkerError> {
    Selector::parse(css).map_err(|e| MarkerError {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Extract outage records from a page body.
///
/// Pure function of its inputs; calling it twice on the same HTML yields the same batch.
pub fn parse_outage_table(html: &str, markers: &TableMarkers) -> OutageBatch {
    let t0 = std::time::Instant::now();
    let doc = Html::parse_document(html);
    let mut out = OutageBatch::new();

    let Some(container) = doc.select(&markers.container).next() else {
        tracing::warn!(
            marker = markers.container_css(),
            "outage table container not found; page structure may have changed"
        );
        return out;
    };

    let Some(table) = container.select(&markers.table).next() else {
        tracing::warn!(
            marker = markers.table_css(),
            container = markers.container_css(),
            "outage table not found inside container; page structure may have changed"
        );
        return out;
    };

    // first row is the header
    for row in table.select(&ROW).skip(1) {
        match parse_row(row) {
            Some(record) => out.push(record),
            None => counter!("outage_rows_skipped_total").increment(1),
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("outage_parse_ms").record(ms);
    counter!("outage_records_total").increment(out.len() as u64);
    out
}

fn parse_row(row: ElementRef<'_>) -> Option<OutageRecord> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
    if cells.len() < 2 {
        tracing::warn!(
            cells = cells.len(),
            row = %row.html(),
            "skipping row with unexpected column count"
        );
        return None;
    }

    let date = stripped_text(cells[0]);
    let pdf_links: Vec<String> = cells[1]
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| is_pdf_link(href))
        .map(str::to_string)
        .collect();

    if pdf_links.is_empty() {
        tracing::warn!(date = %date, "no PDF links found for date");
        return None;
    }

    Some(OutageRecord { date, pdf_links })
}

/// Each text node is trimmed on its own and the pieces are joined without a separator.
fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Literal, case-sensitive suffix match on the raw href (`a.pdf?v=2` does not count).
pub fn is_pdf_link(href: &str) -> bool {
    href.ends_with(PDF_SUFFIX)
}
