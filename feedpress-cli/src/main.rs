//! feedpress CLI
//!
//! Publishes a tabular product feed as a static catalog: per-product pages,
//! mirrored images, catalog/sitemap snapshots, and a synchronized copy in
//! the destination's PostgreSQL database.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use feedpress_publish::{derive_base_url, run_pipeline, PipelineEvent, RunConfig, SyncStatus};

#[derive(Parser)]
#[command(name = "feedpress")]
#[command(about = "Publish a product feed as a static catalog", long_about = None)]
struct Cli {
    /// Destination root the site is published under
    /// (e.g. /var/www/shop.example.com)
    #[arg(short, long)]
    destination: PathBuf,

    /// Product feed CSV path
    #[arg(short, long)]
    feed: PathBuf,

    /// Clear existing database rows before inserting (full resync)
    #[arg(long)]
    force: bool,

    /// Public base URL (default: https:// + the destination's last path segment)
    #[arg(long)]
    base_url: Option<String>,

    /// Page template (Tera syntax) overriding the built-in one
    #[arg(long)]
    template: Option<PathBuf>,

    /// Directory for catalog, sitemap, and report artifacts
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Maximum concurrent image downloads
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let base_url = match cli
        .base_url
        .clone()
        .or_else(|| derive_base_url(&cli.destination))
    {
        Some(url) => url,
        None => {
            log::error!(
                "cannot derive a base URL from \"{}\"; pass --base-url",
                cli.destination.display()
            );
            std::process::exit(2);
        }
    };

    let config = RunConfig::new(
        cli.destination,
        cli.feed,
        cli.data_dir,
        base_url,
        cli.force,
        cli.template,
        cli.workers,
    );

    log::info!(
        "Publishing {} to {}",
        config.feed_path.display().if_supports_color(Stdout, |t| t.cyan()),
        config.destination_root.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "{}",
        format!("Base URL: {}", config.base_url).if_supports_color(Stdout, |t| t.dimmed()),
    );
    if config.force_regeneration {
        log::info!(
            "{}",
            "Force regeneration: database rows will be cleared first"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    let exit_code = rt.block_on(run(config, cli.quiet));
    std::process::exit(exit_code);
}

async fn run(config: RunConfig, quiet: bool) -> i32 {
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("cancellation requested, aborting in-flight downloads");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let pb = progress_bar(quiet);

    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<PipelineEvent>();
    let pipeline = run_pipeline(&config, cancel, event_tx);
    tokio::pin!(pipeline);

    // Drive the pipeline while rendering its events, then drain stragglers.
    let mut result = None;
    while result.is_none() {
        tokio::select! {
            r = &mut pipeline => result = Some(r),
            event = event_rx.recv() => {
                if let Some(event) = event {
                    handle_event(&pb, event);
                }
            }
        }
    }
    while let Ok(event) = event_rx.try_recv() {
        handle_event(&pb, event);
    }
    pb.finish_and_clear();

    match result.expect("pipeline result present") {
        Ok(summary) => {
            log::info!(
                "{} {} of {} pages published",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                summary.published,
                summary.total,
            );
            if summary.failed > 0 {
                log::warn!(
                    "{} {} records failed (see the run summary)",
                    "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                    summary.failed,
                );
            }
            match &summary.sync {
                SyncStatus::Completed(sync) => log::info!(
                    "{} database \"{}\": {} inserted, {} updated",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    sync.destination,
                    sync.inserted,
                    sync.updated,
                ),
                SyncStatus::Skipped { reason } => log::warn!(
                    "{} synchronization skipped: {}",
                    "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                    reason,
                ),
            }
            log::info!("Run summary: {}", summary.report_path.display());
            0
        }
        Err(e) => {
            log::error!(
                "{} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            1
        }
    }
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} [{pos}/{len}] {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn handle_event(pb: &ProgressBar, event: PipelineEvent) {
    match event {
        PipelineEvent::ReadingFeed => pb.set_message("Reading feed..."),
        PipelineEvent::FeedLoaded { total } => {
            pb.set_length(total as u64);
            pb.set_message(format!("{} records", total));
        }
        PipelineEvent::RecordStarted { .. } => {}
        PipelineEvent::RecordFetching { title, .. } => {
            pb.set_message(format!("Downloading image for {}", title));
        }
        PipelineEvent::RecordRendering { title, .. } => {
            pb.set_message(format!("Rendering {}", title));
        }
        PipelineEvent::RecordCompleted { .. } => pb.inc(1),
        PipelineEvent::RecordFailed { title, reason, .. } => {
            pb.inc(1);
            log::warn!(
                "  {} {}: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                title,
                reason,
            );
        }
        PipelineEvent::ExportingCatalog => pb.set_message("Exporting catalog and sitemap..."),
        PipelineEvent::ResolvingCredentials => pb.set_message("Resolving credentials..."),
        PipelineEvent::Syncing { database } => {
            pb.set_message(format!("Synchronizing to {}", database));
        }
        PipelineEvent::SyncSkipped { .. } => {}
        PipelineEvent::Reporting => pb.set_message("Writing run summary..."),
        PipelineEvent::Done => {}
    }
}

fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
