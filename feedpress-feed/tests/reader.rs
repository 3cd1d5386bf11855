use std::io::Write;

use feedpress_feed::{read_feed, FeedError};
use tempfile::TempDir;

const HEADER: &str = "Title,Regular Price,Image,Category,Short_description,description";

fn write_feed(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn reads_records_in_feed_order() {
    let dir = TempDir::new().unwrap();
    let path = write_feed(
        &dir,
        "products.csv",
        &format!(
            "{HEADER}\n\
             Blue Mug,250,http://x/a.jpg,Kitchen,A mug,A blue mug\n\
             Red Cup,120,http://x/b.png,Kitchen,A cup,A red cup\n"
        ),
    );

    let records = read_feed(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "Blue Mug");
    assert_eq!(records[0].price, "250");
    assert_eq!(records[0].image_source, "http://x/a.jpg");
    assert_eq!(records[1].title, "Red Cup");
}

#[test]
fn missing_optional_values_become_empty_strings() {
    let dir = TempDir::new().unwrap();
    let path = write_feed(
        &dir,
        "products.csv",
        &format!("{HEADER}\nBlue Mug,250\n"),
    );

    let records = read_feed(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].image_source, "");
    assert_eq!(records[0].category, "");
    assert_eq!(records[0].description, "");
    assert!(!records[0].has_image());
}

#[test]
fn empty_title_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write_feed(
        &dir,
        "products.csv",
        &format!(
            "{HEADER}\n\
             ,250,http://x/a.jpg,Kitchen,,\n\
             Red Cup,120,,,,\n"
        ),
    );

    let records = read_feed(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Red Cup");
}

#[test]
fn missing_required_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_feed(
        &dir,
        "products.csv",
        "Title,Image,Category\nBlue Mug,http://x/a.jpg,Kitchen\n",
    );

    match read_feed(&path) {
        Err(FeedError::MissingColumn(col)) => assert_eq!(col, "Regular Price"),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn unreadable_feed_is_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");
    assert!(matches!(read_feed(&missing), Err(FeedError::Open { .. })));
}

#[test]
fn quoted_fields_are_preserved() {
    let dir = TempDir::new().unwrap();
    let path = write_feed(
        &dir,
        "products.csv",
        &format!(
            "{HEADER}\n\
             \"Tom \"\"Tiny\"\" Shoe\",99,http://x/shoe.jpg,\"Shoes, Kids\",Small,\"A tiny, tiny shoe\"\n"
        ),
    );

    let records = read_feed(&path).unwrap();
    assert_eq!(records[0].title, "Tom \"Tiny\" Shoe");
    assert_eq!(records[0].category, "Shoes, Kids");
    assert_eq!(records[0].description, "A tiny, tiny shoe");
}
