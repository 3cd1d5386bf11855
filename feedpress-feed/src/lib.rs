//! Product feed data model, slug derivation, and CSV feed reading.
//!
//! This crate defines the record type one pipeline run operates on without
//! any network or database dependencies. Slug and public-URL derivation live
//! here so that page files, mirrored images, catalog exports, and database
//! rows all agree on names.

pub mod reader;
pub mod slug;
pub mod types;

pub use reader::{read_feed, FeedError, REQUIRED_COLUMNS};
pub use slug::{image_extension, image_url, page_url, slugify};
pub use types::ProductRecord;
