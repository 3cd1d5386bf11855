//! Product page rendering.

use std::path::Path;

use feedpress_feed::ProductRecord;
use tera::Tera;

use crate::error::RenderError;
use crate::fetch::{part_path, PartGuard};

/// Built-in page template; a `--template` override replaces it for the run.
const DEFAULT_TEMPLATE: &str = include_str!("../templates/product.html");

const TEMPLATE_NAME: &str = "product";

/// Renders product pages from a Tera template.
///
/// The template is loaded once per run; a template that cannot be read or
/// parsed is a configuration error surfaced at startup, since every record
/// would fail on it identically.
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new(template_path: Option<&Path>) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        match template_path {
            Some(path) => {
                let source = std::fs::read_to_string(path)?;
                tera.add_raw_template(TEMPLATE_NAME, &source)?;
            }
            None => tera.add_raw_template(TEMPLATE_NAME, DEFAULT_TEMPLATE)?,
        }
        Ok(Self { tera })
    }

    /// Render one page. Pure with respect to the record and image URL;
    /// `image_url` is `None` when the record has no mirrored image.
    pub fn render(
        &self,
        record: &ProductRecord,
        image_url: Option<&str>,
    ) -> Result<String, RenderError> {
        let mut context = tera::Context::new();
        context.insert("title", &record.title);
        context.insert("price", &record.price);
        context.insert("category", &record.category);
        context.insert("short_description", &record.short_description);
        context.insert("description", &record.description);
        context.insert("image", &image_url);
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }

    /// Render and write a page, via a temp path and atomic rename so a
    /// partial page never sits at its final location.
    pub async fn write_page(
        &self,
        record: &ProductRecord,
        image_url: Option<&str>,
        dest: &Path,
    ) -> Result<(), RenderError> {
        let html = self.render(record, image_url)?;

        let part = part_path(dest);
        let mut guard = PartGuard::new(part.clone());
        tokio::fs::write(&part, html).await?;
        tokio::fs::rename(&part, dest).await?;
        guard.disarm();
        Ok(())
    }
}
