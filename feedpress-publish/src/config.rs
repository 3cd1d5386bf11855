//! Run configuration.

use std::path::{Path, PathBuf};

/// Immutable configuration for one pipeline run.
///
/// Constructed once from the run parameters and threaded by reference
/// through every component; never mutated after construction.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Destination root the site is published under
    /// (e.g. `/var/www/shop.example.com`).
    pub destination_root: PathBuf,
    /// `{destination_root}/public/products`
    pub pages_dir: PathBuf,
    /// `{destination_root}/public/images`
    pub images_dir: PathBuf,
    /// Directory for catalog, sitemap, and report artifacts.
    pub data_dir: PathBuf,
    /// Canonical public base URL, without a trailing slash.
    pub base_url: String,
    /// Path to the feed CSV.
    pub feed_path: PathBuf,
    /// Feed filename without extension; stamps artifact names so historical
    /// snapshots from different feeds don't overwrite each other.
    pub feed_stem: String,
    /// Clear database rows before inserting (full resync).
    pub force_regeneration: bool,
    /// Optional page template override (Tera syntax).
    pub template_path: Option<PathBuf>,
    /// Bound on concurrent per-record workers.
    pub workers: usize,
}

impl RunConfig {
    pub fn new(
        destination_root: PathBuf,
        feed_path: PathBuf,
        data_dir: PathBuf,
        base_url: String,
        force_regeneration: bool,
        template_path: Option<PathBuf>,
        workers: usize,
    ) -> Self {
        let pages_dir = destination_root.join("public").join("products");
        let images_dir = destination_root.join("public").join("images");
        let feed_stem = feed_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "products".to_string());

        Self {
            destination_root,
            pages_dir,
            images_dir,
            data_dir,
            base_url: base_url.trim_end_matches('/').to_string(),
            feed_path,
            feed_stem,
            force_regeneration,
            template_path,
            workers: workers.max(1),
        }
    }

    /// Domain identity of the destination: its last path segment.
    pub fn domain(&self) -> String {
        self.destination_root
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Create the output directories if absent.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [&self.pages_dir, &self.images_dir, &self.data_dir] {
            if dir.is_dir() {
                log::debug!("directory already exists: {}", dir.display());
            } else {
                std::fs::create_dir_all(dir)?;
                log::info!("created directory: {}", dir.display());
            }
        }
        Ok(())
    }

    pub fn page_path(&self, slug: &str) -> PathBuf {
        self.pages_dir.join(format!("{}.html", slug))
    }

    pub fn image_path(&self, slug: &str, extension: &str) -> PathBuf {
        self.images_dir.join(format!("{}{}", slug, extension))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}_database.csv", self.feed_stem))
    }

    pub fn sitemap_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}_sitemap.xml", self.feed_stem))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}_database_summary.txt", self.feed_stem))
    }
}

/// Derive the canonical base URL from a destination root:
/// `/var/www/shop.example.com` → `https://shop.example.com`.
pub fn derive_base_url(destination_root: &Path) -> Option<String> {
    let segment = destination_root.file_name()?.to_string_lossy();
    if segment.is_empty() {
        return None;
    }
    Some(format!("https://{}", segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_base_url_from_last_segment() {
        assert_eq!(
            derive_base_url(Path::new("/var/www/shop.example.com")).as_deref(),
            Some("https://shop.example.com")
        );
        assert_eq!(derive_base_url(Path::new("/")), None);
    }

    #[test]
    fn artifact_paths_are_feed_stamped() {
        let config = RunConfig::new(
            PathBuf::from("/var/www/shop.example.com"),
            PathBuf::from("feeds/products_01.csv"),
            PathBuf::from("data"),
            "https://shop.example.com/".to_string(),
            false,
            None,
            4,
        );

        assert_eq!(config.base_url, "https://shop.example.com");
        assert_eq!(config.feed_stem, "products_01");
        assert_eq!(
            config.catalog_path(),
            PathBuf::from("data/products_01_database.csv")
        );
        assert_eq!(
            config.sitemap_path(),
            PathBuf::from("data/products_01_sitemap.xml")
        );
        assert_eq!(
            config.page_path("blue-mug"),
            PathBuf::from("/var/www/shop.example.com/public/products/blue-mug.html")
        );
        assert_eq!(
            config.image_path("blue-mug", ".jpg"),
            PathBuf::from("/var/www/shop.example.com/public/images/blue-mug.jpg")
        );
    }
}
