//! Idempotent product synchronization into PostgreSQL.
//!
//! One connection per run. Connectivity, schema, and clear failures abort
//! only the synchronization phase; individual upsert failures are logged and
//! the remaining records still processed.

use feedpress_feed::{image_extension, image_url, page_url, slugify, ProductRecord};
use thiserror::Error;
use tokio_postgres::{Client, NoTls};

use crate::credentials::Credentials;

/// Failures that cause the synchronization phase to be skipped.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("connection failed: {0}")]
    Connectivity(tokio_postgres::Error),
    #[error("schema setup failed: {0}")]
    Schema(tokio_postgres::Error),
    #[error("clearing existing products failed: {0}")]
    Clear(tokio_postgres::Error),
}

/// Insert/update counts for one completed synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub inserted: u64,
    pub updated: u64,
    /// Database name the rows were written to.
    pub destination: String,
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255),
    price INTEGER,
    product_link TEXT,
    category VARCHAR(100),
    image_url TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_products_title ON products(title);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
"#;

/// Connect and probe the destination database.
pub async fn connect(creds: &Credentials) -> Result<Client, SyncError> {
    let (client, connection) = tokio_postgres::Config::new()
        .host(&creds.host)
        .port(creds.port)
        .user(&creds.user)
        .password(&creds.password)
        .dbname(&creds.database)
        .connect(NoTls)
        .await
        .map_err(SyncError::Connectivity)?;

    // The connection object drives the socket; it must be polled for the
    // client to make progress.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("postgres connection error: {}", e);
        }
    });

    client
        .batch_execute("SELECT 1")
        .await
        .map_err(SyncError::Connectivity)?;

    Ok(client)
}

/// Create the products table and its indexes if absent. Idempotent.
pub async fn ensure_schema(client: &Client) -> Result<(), SyncError> {
    client
        .batch_execute(SCHEMA_SQL)
        .await
        .map_err(SyncError::Schema)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upserted {
    Inserted,
    Updated,
}

/// Insert or update one product row, keyed by title.
///
/// Re-queries current state on every call, so duplicate titles within one
/// feed resolve to last-write-wins in feed order.
async fn upsert_product(
    client: &Client,
    record: &ProductRecord,
    base_url: &str,
) -> Result<Upserted, tokio_postgres::Error> {
    let slug = slugify(&record.title);
    let product_link = page_url(base_url, &slug);
    let image_url = image_url(base_url, &slug, &image_extension(&record.image_source));
    let price = coerce_price(&record.price);

    let existing = client
        .query("SELECT id FROM products WHERE title = $1", &[&record.title])
        .await?;

    if existing.is_empty() {
        client
            .execute(
                "INSERT INTO products (title, price, product_link, category, image_url)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &record.title,
                    &price,
                    &product_link,
                    &record.category,
                    &image_url,
                ],
            )
            .await?;
        Ok(Upserted::Inserted)
    } else {
        client
            .execute(
                "UPDATE products
                 SET price = $2, product_link = $3, category = $4, image_url = $5,
                     updated_at = CURRENT_TIMESTAMP
                 WHERE title = $1",
                &[
                    &record.title,
                    &price,
                    &product_link,
                    &record.category,
                    &image_url,
                ],
            )
            .await?;
        Ok(Upserted::Updated)
    }
}

/// Synchronize all records into the destination database.
///
/// When `force_regeneration` is set, existing rows are deleted first so the
/// run is a full resync. Each upsert is isolated: a failed record is logged
/// and skipped, never aborting the batch.
pub async fn sync_products(
    creds: &Credentials,
    records: &[ProductRecord],
    base_url: &str,
    force_regeneration: bool,
) -> Result<SyncResult, SyncError> {
    let client = connect(creds).await?;
    ensure_schema(&client).await?;

    if force_regeneration {
        log::info!("force regeneration: clearing existing products");
        client
            .execute("DELETE FROM products", &[])
            .await
            .map_err(SyncError::Clear)?;
    }

    let mut inserted = 0u64;
    let mut updated = 0u64;
    for record in records {
        match upsert_product(&client, record, base_url).await {
            Ok(Upserted::Inserted) => inserted += 1,
            Ok(Upserted::Updated) => updated += 1,
            Err(e) => log::error!("upsert failed for \"{}\": {}", record.title, e),
        }
    }

    log::info!(
        "database updated: {} inserted, {} updated",
        inserted,
        updated
    );

    Ok(SyncResult {
        inserted,
        updated,
        destination: creds.database.clone(),
    })
}

/// Coerce raw feed price text to an integer.
///
/// Leading-integer semantics: optional sign, then digits up to the first
/// non-digit character; anything without a leading integer coerces to 0.
/// So "250" → 250, "249.99" → 249, "₹1,299" → 0.
pub fn coerce_price(raw: &str) -> i32 {
    let s = raw.trim();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }

    let value: i64 = digits.parse().unwrap_or(i64::from(i32::MAX));
    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::coerce_price;

    #[test]
    fn coerces_plain_integers() {
        assert_eq!(coerce_price("250"), 250);
        assert_eq!(coerce_price(" 42 "), 42);
        assert_eq!(coerce_price("-7"), -7);
        assert_eq!(coerce_price("+19"), 19);
    }

    #[test]
    fn truncates_at_first_non_digit() {
        assert_eq!(coerce_price("249.99"), 249);
        assert_eq!(coerce_price("1,299"), 1);
        assert_eq!(coerce_price("250 INR"), 250);
    }

    #[test]
    fn non_numeric_coerces_to_zero() {
        assert_eq!(coerce_price(""), 0);
        assert_eq!(coerce_price("free"), 0);
        assert_eq!(coerce_price("₹1,299"), 0);
        assert_eq!(coerce_price("$99"), 0);
    }

    #[test]
    fn clamps_oversized_values() {
        assert_eq!(coerce_price("99999999999999999999"), i32::MAX);
    }
}
