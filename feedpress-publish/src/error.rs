//! Error types for the publishing pipeline.

use thiserror::Error;

/// Per-record failure while mirroring a remote image. The run continues.
#[derive(Debug, Error)]
pub enum AssetFetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("empty response body for {url}")]
    Empty { url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-record failure while rendering a product page. The run continues.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure writing the catalog snapshot or sitemap. Fatal to the run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures that abort the whole run. Everything else is scoped to a record
/// or to the synchronization phase and reflected in counts instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Feed(#[from] feedpress_feed::FeedError),

    #[error("failed to load page template: {0}")]
    Template(#[source] RenderError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("run cancelled")]
    Cancelled,
}
