//! CSV feed reading.

use std::path::Path;

use thiserror::Error;

use crate::types::ProductRecord;

/// Header columns the feed must carry, exactly as spelled (case-sensitive).
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Title",
    "Regular Price",
    "Image",
    "Category",
    "Short_description",
    "description",
];

/// Errors that abort the run: a feed that cannot be read is fatal.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to open feed {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("feed is missing required column \"{0}\"")]
    MissingColumn(&'static str),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Read the product feed, preserving input row order.
///
/// Cells missing a value come back as empty strings rather than being
/// omitted. Rows with an empty title are invalid: they are skipped with a
/// logged error and do not reach the pipeline.
pub fn read_feed(path: &Path) -> Result<Vec<ProductRecord>, FeedError> {
    let file = std::fs::File::open(path).map_err(|source| FeedError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader.headers()?.clone();
    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(FeedError::MissingColumn(name))?;
    }
    let [title, price, image, category, short_description, description] = columns;

    let mut records = Vec::new();
    for (row_number, row) in reader.records().enumerate() {
        let row = row?;
        let field = |idx: usize| row.get(idx).unwrap_or("").to_string();

        let record = ProductRecord {
            title: field(title),
            price: field(price),
            image_source: field(image),
            category: field(category),
            short_description: field(short_description),
            description: field(description),
        };

        if record.title.trim().is_empty() {
            log::error!(
                "skipping feed row {}: empty title",
                // +2: one for the header line, one for 1-based numbering
                row_number + 2
            );
            continue;
        }
        records.push(record);
    }

    Ok(records)
}
