//! Slug derivation and public-URL building.
//!
//! Every artifact name and public link is derived from the product title by
//! [`slugify`]; keeping the function (and the URL builders on top of it) in
//! one place is what keeps pages, images, exports, and database rows in
//! agreement.

use std::path::Path;

/// Extension used when the image source URL carries none.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";

/// Derive a URL/filename-safe slug from a product title.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `-`, and trims leading/trailing dashes. Idempotent: slugifying a
/// slug returns it unchanged.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Extract the file extension (including the dot) from an image source URL.
///
/// Query string and fragment are stripped before looking at the path.
/// Falls back to [`DEFAULT_IMAGE_EXTENSION`] when the path has none.
pub fn image_extension(image_source: &str) -> String {
    let path = image_source
        .split(['?', '#'])
        .next()
        .unwrap_or(image_source);
    match Path::new(path).extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy()),
        _ => DEFAULT_IMAGE_EXTENSION.to_string(),
    }
}

/// Canonical public URL of a product page.
pub fn page_url(base_url: &str, slug: &str) -> String {
    format!("{}/public/products/{}.html", base_url, slug)
}

/// Canonical public URL of a mirrored product image.
///
/// `extension` includes the leading dot, as returned by [`image_extension`].
pub fn image_url(base_url: &str, slug: &str, extension: &str) -> String {
    format!("{}/public/images/{}{}", base_url, slug, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Blue Mug"), "blue-mug");
        assert_eq!(slugify("Tom \"Tiny\" Shoe"), "tom-tiny-shoe");
        assert_eq!(slugify("  -- Fancy!! Lamp --  "), "fancy-lamp");
    }

    #[test]
    fn slugify_collapses_runs() {
        assert_eq!(slugify("a   b///c"), "a-b-c");
        assert_eq!(slugify("Ceramic & Clay (Set of 2)"), "ceramic-clay-set-of-2");
    }

    #[test]
    fn slugify_is_idempotent() {
        for title in ["Blue Mug", "Tom \"Tiny\" Shoe", "été 2024", "___", ""] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn extension_from_source() {
        assert_eq!(image_extension("http://x/a.jpg"), ".jpg");
        assert_eq!(image_extension("http://x/a.PNG"), ".PNG");
        assert_eq!(image_extension("http://x/a.webp?size=large"), ".webp");
        assert_eq!(image_extension("http://x/no-extension"), ".jpg");
        assert_eq!(image_extension(""), ".jpg");
    }

    #[test]
    fn url_builders() {
        assert_eq!(
            page_url("https://shop.example.com", "blue-mug"),
            "https://shop.example.com/public/products/blue-mug.html"
        );
        assert_eq!(
            image_url("https://shop.example.com", "blue-mug", ".jpg"),
            "https://shop.example.com/public/images/blue-mug.jpg"
        );
    }
}
