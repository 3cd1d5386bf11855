//! Data model for one pipeline run.

/// A single product row from the feed.
///
/// All fields are kept as strings exactly as they appear in the feed; price
/// coercion happens at the database boundary. `title` is the natural key for
/// everything downstream — an empty title makes the record invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub title: String,
    /// Raw price text from the feed (e.g. "250" or "249.99").
    pub price: String,
    /// Remote image URI. May be empty when the feed has no image.
    pub image_source: String,
    pub category: String,
    pub short_description: String,
    pub description: String,
}

impl ProductRecord {
    /// True when the record carries a remote image to mirror.
    pub fn has_image(&self) -> bool {
        !self.image_source.trim().is_empty()
    }
}
