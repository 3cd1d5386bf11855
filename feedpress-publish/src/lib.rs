//! Publishing pipeline: asset mirroring, page rendering, catalog export,
//! run reporting, and the per-record orchestrator.
//!
//! The pipeline tolerates partial failure per record: one product's fetch or
//! render failure is logged and reflected in counts, never aborting the run.
//! Only an unreadable feed or a failed catalog export is fatal.

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod pipeline;
pub mod render;
pub mod report;

pub use config::{derive_base_url, RunConfig};
pub use error::{AssetFetchError, ExportError, PipelineError, RenderError};
pub use pipeline::{run_pipeline, PipelineEvent, RunSummary};
pub use report::SyncStatus;
