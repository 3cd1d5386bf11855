use std::path::PathBuf;

use chrono::Utc;
use feedpress_feed::ProductRecord;
use feedpress_publish::config::RunConfig;
use feedpress_publish::export::{write_catalog, write_sitemap};
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> RunConfig {
    RunConfig::new(
        dir.path().join("shop.example.com"),
        PathBuf::from("products.csv"),
        dir.path().join("data"),
        "https://shop.example.com".to_string(),
        false,
        None,
        4,
    )
}

fn record(title: &str, price: &str, image: &str, category: &str) -> ProductRecord {
    ProductRecord {
        title: title.to_string(),
        price: price.to_string(),
        image_source: image.to_string(),
        category: category.to_string(),
        short_description: String::new(),
        description: String::new(),
    }
}

#[test]
fn catalog_rows_carry_canonical_urls() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    config.ensure_directories().unwrap();

    let records = vec![record("Blue Mug", "250", "http://x/a.jpg", "Kitchen")];
    let path = write_catalog(&records, &config).unwrap();
    let content = std::fs::read_to_string(path).unwrap();

    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "title,price,product_link,category,image_url"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("https://shop.example.com/public/products/blue-mug.html"));
    assert!(row.contains("https://shop.example.com/public/images/blue-mug.jpg"));
}

#[test]
fn catalog_escapes_embedded_quotes() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    config.ensure_directories().unwrap();

    let records = vec![record("Tom \"Tiny\" Shoe", "99", "", "Shoes")];
    let path = write_catalog(&records, &config).unwrap();
    let content = std::fs::read_to_string(path).unwrap();

    assert!(content.contains("\"Tom \"\"Tiny\"\" Shoe\""));
}

#[test]
fn empty_feed_still_produces_header() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    config.ensure_directories().unwrap();

    let path = write_catalog(&[], &config).unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    assert_eq!(
        content.trim_end(),
        "title,price,product_link,category,image_url"
    );
}

#[test]
fn sitemap_has_one_entry_per_record_plus_root() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    config.ensure_directories().unwrap();

    let records = vec![
        record("Blue Mug", "250", "http://x/a.jpg", "Kitchen"),
        record("Red Cup", "120", "http://x/b.png", "Kitchen"),
        record("Green Bowl", "300", "", "Kitchen"),
    ];
    let path = write_sitemap(&records, &config, Utc::now()).unwrap();
    let content = std::fs::read_to_string(path).unwrap();

    assert_eq!(content.matches("<url>").count(), records.len() + 1);
    assert!(content.contains("<loc>https://shop.example.com</loc>"));
    assert!(content.contains("<loc>https://shop.example.com/public/products/green-bowl.html</loc>"));
    assert!(content.contains("<lastmod>"));
    assert!(content.contains("<priority>1.0</priority>"));
}

#[test]
fn sitemap_uses_feed_stamped_filename() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::new(
        dir.path().join("shop.example.com"),
        PathBuf::from("feeds/summer_2026.csv"),
        dir.path().join("data"),
        "https://shop.example.com".to_string(),
        false,
        None,
        4,
    );
    config.ensure_directories().unwrap();

    let path = write_sitemap(&[], &config, Utc::now()).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "summer_2026_sitemap.xml"
    );
}
