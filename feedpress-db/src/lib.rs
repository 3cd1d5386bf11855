//! PostgreSQL persistence layer for the published catalog.
//!
//! Provides destination-scoped credential resolution and the idempotent
//! product synchronizer (schema ensure, optional clear, upsert by title).

pub mod credentials;
pub mod sync;

pub use credentials::{resolve_credentials, CredentialStore, Credentials};
pub use sync::{coerce_price, sync_products, SyncError, SyncResult};
