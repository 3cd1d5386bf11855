//! Catalog snapshot and sitemap export.
//!
//! Both artifacts cover ALL records in feed order, regardless of per-record
//! fetch/render outcomes: links are computed from the base URL, never
//! verified against generated files. Filenames are stamped with the feed
//! stem, so snapshots from different feeds accumulate instead of clobbering
//! one another.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use feedpress_feed::{image_extension, image_url, page_url, slugify, ProductRecord};
use serde::Serialize;

use crate::config::RunConfig;
use crate::error::ExportError;

/// One catalog snapshot row; field order matches the exported header.
#[derive(Debug, Serialize)]
struct CatalogRow<'a> {
    title: &'a str,
    price: &'a str,
    product_link: String,
    category: &'a str,
    image_url: String,
}

/// Write the catalog CSV. Embedded quotes are doubled and the field quoted
/// per RFC 4180 (`Tom "Tiny" Shoe` → `"Tom ""Tiny"" Shoe"`).
pub fn write_catalog(
    records: &[ProductRecord],
    config: &RunConfig,
) -> Result<PathBuf, ExportError> {
    let path = config.catalog_path();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;

    // Written explicitly so an empty feed still produces a headed snapshot.
    writer.write_record(["title", "price", "product_link", "category", "image_url"])?;

    for record in records {
        let slug = slugify(&record.title);
        writer.serialize(CatalogRow {
            title: &record.title,
            price: &record.price,
            product_link: page_url(&config.base_url, &slug),
            category: &record.category,
            image_url: image_url(
                &config.base_url,
                &slug,
                &image_extension(&record.image_source),
            ),
        })?;
    }
    writer.flush()?;

    log::info!("catalog snapshot written: {}", path.display());
    Ok(path)
}

/// Write the sitemap: one root entry plus exactly one entry per record.
pub fn write_sitemap(
    records: &[ProductRecord],
    config: &RunConfig,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let lastmod = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    write_url(&mut xml, &config.base_url, &lastmod, "1.0");
    for record in records {
        let slug = slugify(&record.title);
        write_url(
            &mut xml,
            &page_url(&config.base_url, &slug),
            &lastmod,
            "0.8",
        );
    }
    xml.push_str("</urlset>\n");

    let path = config.sitemap_path();
    std::fs::write(&path, xml)?;

    log::info!("sitemap written: {}", path.display());
    Ok(path)
}

fn write_url(xml: &mut String, loc: &str, lastmod: &str, priority: &str) {
    xml.push_str("    <url>\n");
    write_tag(xml, "loc", loc);
    write_tag(xml, "lastmod", lastmod);
    write_tag(xml, "priority", priority);
    xml.push_str("    </url>\n");
}

fn write_tag(xml: &mut String, tag: &str, value: &str) {
    xml.push_str("        <");
    xml.push_str(tag);
    xml.push('>');
    xml.push_str(&escape_xml(value));
    xml.push_str("</");
    xml.push_str(tag);
    xml.push_str(">\n");
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
