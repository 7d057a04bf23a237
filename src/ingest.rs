//! History-export ingestion: turn a CSV export into normalized records.
//!
//! Two export shapes are supported and auto-detected from the header row:
//! a plain 3-column `dateTime,url,title` form, and a multi-column form whose
//! header carries `order` and `visitCount` tokens and whose `date`, `time`,
//! `title` and `url` columns may appear in any order.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::record::BrowsingRecord;

pub fn load_history(path: &Path) -> Result<Vec<BrowsingRecord>> {
    info!(action = "load", component = "ingest", file_path = ?path, "Loading history export");
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history export {:?}", path))?;
    parse_history(&content)
}

pub fn parse_history(content: &str) -> Result<Vec<BrowsingRecord>> {
    let start_time = Instant::now();

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Failed to read header row")?.clone();
    let rows: Vec<StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .context("Failed to read history rows")?;

    let multi_column = is_multi_column(&headers);
    info!(
        action = "detect",
        component = "ingest",
        multi_column = multi_column,
        row_count = rows.len(),
        workers = rayon::current_num_threads(),
        "Detected export shape"
    );

    let records: Vec<BrowsingRecord> = if multi_column {
        let columns = MultiColumnLayout::from_headers(&headers)?;
        rows.par_iter()
            .filter_map(|row| columns.record_from(row))
            .collect()
    } else {
        rows.par_iter().filter_map(record_from_plain_row).collect()
    };

    let skipped = rows.len() - records.len();
    if skipped > 0 {
        warn!(
            action = "skip",
            component = "ingest",
            skipped_rows = skipped,
            "Skipped rows with missing fields"
        );
    }

    let duration = start_time.elapsed();
    info!(
        action = "complete",
        component = "ingest",
        record_count = records.len(),
        duration_ms = duration.as_millis(),
        "History export parsed"
    );
    Ok(records)
}

fn is_multi_column(headers: &StringRecord) -> bool {
    let has = |token: &str| headers.iter().any(|column| column == token);
    has("order") && has("visitCount")
}

/// Column positions of the multi-column export, resolved from its header row.
struct MultiColumnLayout {
    date: usize,
    time: usize,
    title: usize,
    url: usize,
}

impl MultiColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|column| column == name)
                .with_context(|| format!("History export is missing the '{}' column", name))
        };
        Ok(Self {
            date: position("date")?,
            time: position("time")?,
            title: position("title")?,
            url: position("url")?,
        })
    }

    fn record_from(&self, row: &StringRecord) -> Option<BrowsingRecord> {
        let date = non_empty(row.get(self.date)?)?;
        let time = non_empty(row.get(self.time)?)?;
        let url = non_empty(row.get(self.url)?)?;
        let title = non_empty(row.get(self.title)?)?;
        Some(BrowsingRecord::new(format!("{date} {time}"), url, title))
    }
}

fn record_from_plain_row(row: &StringRecord) -> Option<BrowsingRecord> {
    let date_time = non_empty(row.get(0)?)?;
    let url = non_empty(row.get(1)?)?;
    let title = non_empty(row.get(2)?)?;
    Some(BrowsingRecord::new(date_time, url, title))
}

fn non_empty(field: &str) -> Option<&str> {
    let field = field.trim();
    (!field.is_empty()).then_some(field)
}
