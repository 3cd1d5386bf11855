//! Run log and summary report.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use feedpress_db::SyncResult;

/// Outcome of one record's fetch + render, in feed order.
#[derive(Debug, Clone)]
pub enum RecordEntry {
    Published { slug: String, image_mirrored: bool },
    Failed { title: String, reason: String },
}

/// Outcome of the synchronization phase. Skipping is a normal, reportable
/// result, not an error.
#[derive(Debug, Clone)]
pub enum SyncStatus {
    Completed(SyncResult),
    Skipped { reason: String },
}

/// Collects per-record outcomes and writes the run summary file.
#[derive(Debug, Default)]
pub struct RunLog {
    entries: Vec<RecordEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: RecordEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn published(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, RecordEntry::Published { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, RecordEntry::Failed { .. }))
            .count()
    }

    /// Write the plain-text summary, produced whenever the synchronization
    /// phase ran — completed or skipped — so operators can audit why a sync
    /// did or did not occur.
    pub fn write_summary(
        &self,
        path: &Path,
        feed_path: &Path,
        status: &SyncStatus,
        generated_at: DateTime<Utc>,
    ) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;

        let (database, inserted, updated) = match status {
            SyncStatus::Completed(result) => {
                (result.destination.clone(), result.inserted, result.updated)
            }
            SyncStatus::Skipped { reason } => (format!("skipped ({})", reason), 0, 0),
        };

        writeln!(file, "Database Update Summary")?;
        writeln!(
            file,
            "Generated: {}",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(file, "Database: {}", database)?;
        writeln!(file, "Products Inserted: {}", inserted)?;
        writeln!(file, "Products Updated: {}", updated)?;
        writeln!(file, "Total Products: {}", inserted + updated)?;
        writeln!(file, "Source File: {}", feed_path.display())?;
        writeln!(file)?;
        writeln!(file, "--- Records ---")?;
        writeln!(file, "Published: {}", self.published())?;
        writeln!(file, "Failed: {}", self.failed())?;
        writeln!(file)?;

        for entry in &self.entries {
            match entry {
                RecordEntry::Published {
                    slug,
                    image_mirrored,
                } => {
                    if *image_mirrored {
                        writeln!(file, "[OK] {}", slug)?;
                    } else {
                        writeln!(file, "[OK] {} (no image)", slug)?;
                    }
                }
                RecordEntry::Failed { title, reason } => {
                    writeln!(file, "[FAIL] {}: {}", title, reason)?;
                }
            }
        }

        Ok(())
    }
}
