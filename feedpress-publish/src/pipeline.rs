//! The ingestion → fetch → render → export → synchronize pipeline.
//!
//! Per-record fetch+render fan out on a bounded worker pool; outcomes are
//! collected keyed by original feed index so the export phase reassembles
//! feed order no matter how downloads interleave. Progress surfaces as
//! [`PipelineEvent`]s over an unbounded channel for the CLI to render.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use feedpress_db::{resolve_credentials, sync_products};
use feedpress_feed::{image_extension, image_url, read_feed, slugify, ProductRecord};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;

use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::export;
use crate::fetch::AssetFetcher;
use crate::render::PageRenderer;
use crate::report::{RecordEntry, RunLog, SyncStatus};

/// Progress events emitted during a run, consumed by the CLI.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Reading and validating the feed.
    ReadingFeed,
    /// Feed parsed; total valid records.
    FeedLoaded { total: usize },
    /// A record was assigned to a worker.
    RecordStarted { index: usize, title: String },
    /// Mirroring the record's image.
    RecordFetching { index: usize, title: String },
    /// Rendering the record's page.
    RecordRendering { index: usize, title: String },
    /// Record fully published.
    RecordCompleted { index: usize, slug: String },
    /// Record failed (non-fatal); the run continues.
    RecordFailed {
        index: usize,
        title: String,
        reason: String,
    },
    /// Writing catalog snapshot and sitemap.
    ExportingCatalog,
    /// Looking up destination credentials.
    ResolvingCredentials,
    /// Upserting into the destination database.
    Syncing { database: String },
    /// Synchronization skipped (non-fatal).
    SyncSkipped { reason: String },
    /// Writing the run summary.
    Reporting,
    /// Run finished.
    Done,
}

/// Terminal result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Valid records read from the feed.
    pub total: usize,
    /// Records with a page at its final path.
    pub published: usize,
    /// Records that failed fetch or render.
    pub failed: usize,
    pub sync: SyncStatus,
    pub report_path: PathBuf,
}

struct RecordOutcome {
    index: usize,
    entry: RecordEntry,
}

/// Run the full pipeline.
///
/// Fatal errors: an unreadable feed, a failed export write, a broken
/// template, and cancellation. Every other failure is scoped to one record
/// or to the synchronization phase and lands in the run report instead.
pub async fn run_pipeline(
    config: &RunConfig,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<PipelineEvent>,
) -> Result<RunSummary, PipelineError> {
    let _ = events.send(PipelineEvent::ReadingFeed);
    let records = read_feed(&config.feed_path)?;
    let _ = events.send(PipelineEvent::FeedLoaded {
        total: records.len(),
    });

    config.ensure_directories()?;

    let renderer = PageRenderer::new(config.template_path.as_deref())
        .map_err(PipelineError::Template)?;
    let fetcher = AssetFetcher::new().map_err(PipelineError::Client)?;

    let mut outcomes: Vec<RecordOutcome> = {
        let fetcher = &fetcher;
        let renderer = &renderer;
        let cancel = &cancel;
        stream::iter(records.iter().enumerate())
            .map(|(index, record)| {
                let events = events.clone();
                async move {
                    if cancel.load(Ordering::Relaxed) {
                        return RecordOutcome {
                            index,
                            entry: RecordEntry::Failed {
                                title: record.title.clone(),
                                reason: "run cancelled".to_string(),
                            },
                        };
                    }
                    process_record(config, fetcher, renderer, index, record, &events).await
                }
            })
            .buffer_unordered(config.workers)
            .collect()
            .await
    };

    if cancel.load(Ordering::Relaxed) {
        return Err(PipelineError::Cancelled);
    }

    // Reassemble feed order: completion order is download-dependent.
    outcomes.sort_by_key(|o| o.index);
    let mut run_log = RunLog::new();
    for outcome in outcomes {
        run_log.add(outcome.entry);
    }

    let _ = events.send(PipelineEvent::ExportingCatalog);
    let generated_at = Utc::now();
    export::write_catalog(&records, config)?;
    export::write_sitemap(&records, config, generated_at)?;

    let _ = events.send(PipelineEvent::ResolvingCredentials);
    let status = synchronize(config, &records, &events).await;

    let _ = events.send(PipelineEvent::Reporting);
    let report_path = config.summary_path();
    run_log.write_summary(&report_path, &config.feed_path, &status, Utc::now())?;
    log::info!("run summary written: {}", report_path.display());

    let summary = RunSummary {
        total: records.len(),
        published: run_log.published(),
        failed: run_log.failed(),
        sync: status,
        report_path,
    };
    let _ = events.send(PipelineEvent::Done);
    Ok(summary)
}

/// Resolve credentials and synchronize; every failure here downgrades to a
/// skipped sync with a recorded reason.
async fn synchronize(
    config: &RunConfig,
    records: &[ProductRecord],
    events: &mpsc::UnboundedSender<PipelineEvent>,
) -> SyncStatus {
    let domain = config.domain();
    let Some(creds) = resolve_credentials(&config.data_dir, &domain) else {
        let reason = format!("no credentials for domain \"{}\"", domain);
        log::warn!("synchronization skipped: {}", reason);
        let _ = events.send(PipelineEvent::SyncSkipped {
            reason: reason.clone(),
        });
        return SyncStatus::Skipped { reason };
    };

    let _ = events.send(PipelineEvent::Syncing {
        database: creds.database.clone(),
    });
    match sync_products(&creds, records, &config.base_url, config.force_regeneration).await {
        Ok(result) => SyncStatus::Completed(result),
        Err(e) => {
            let reason = e.to_string();
            log::warn!("synchronization skipped: {}", reason);
            let _ = events.send(PipelineEvent::SyncSkipped {
                reason: reason.clone(),
            });
            SyncStatus::Skipped { reason }
        }
    }
}

/// Mirror one record's image and render its page. Failures are scoped to
/// the record and reported as an outcome, never an error.
async fn process_record(
    config: &RunConfig,
    fetcher: &AssetFetcher,
    renderer: &PageRenderer,
    index: usize,
    record: &ProductRecord,
    events: &mpsc::UnboundedSender<PipelineEvent>,
) -> RecordOutcome {
    let slug = slugify(&record.title);
    let _ = events.send(PipelineEvent::RecordStarted {
        index,
        title: record.title.clone(),
    });

    let mut public_image = None;
    if record.has_image() {
        let _ = events.send(PipelineEvent::RecordFetching {
            index,
            title: record.title.clone(),
        });
        let extension = image_extension(&record.image_source);
        let dest = config.image_path(&slug, &extension);
        match fetcher.fetch(&record.image_source, &dest).await {
            Ok(()) => {
                log::debug!("mirrored image: {}", dest.display());
                public_image = Some(image_url(&config.base_url, &slug, &extension));
            }
            Err(e) => {
                let reason = e.to_string();
                log::error!("image download failed for \"{}\": {}", record.title, reason);
                let _ = events.send(PipelineEvent::RecordFailed {
                    index,
                    title: record.title.clone(),
                    reason: reason.clone(),
                });
                return RecordOutcome {
                    index,
                    entry: RecordEntry::Failed {
                        title: record.title.clone(),
                        reason,
                    },
                };
            }
        }
    }

    let _ = events.send(PipelineEvent::RecordRendering {
        index,
        title: record.title.clone(),
    });
    let page_path = config.page_path(&slug);
    match renderer
        .write_page(record, public_image.as_deref(), &page_path)
        .await
    {
        Ok(()) => {
            let _ = events.send(PipelineEvent::RecordCompleted {
                index,
                slug: slug.clone(),
            });
            RecordOutcome {
                index,
                entry: RecordEntry::Published {
                    slug,
                    image_mirrored: public_image.is_some(),
                },
            }
        }
        Err(e) => {
            let reason = e.to_string();
            log::error!("page render failed for \"{}\": {}", record.title, reason);
            let _ = events.send(PipelineEvent::RecordFailed {
                index,
                title: record.title.clone(),
                reason: reason.clone(),
            });
            RecordOutcome {
                index,
                entry: RecordEntry::Failed {
                    title: record.title.clone(),
                    reason,
                },
            }
        }
    }
}
