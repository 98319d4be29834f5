//! Sitemap generation.
//!
//! Generates the `sitemap.xml` listing every page of the site with its
//! ledger timestamp.

use std::path::Path;

use tracing::debug;

use crate::output::{WriteOutcome, write_if_changed};

/// File name of the sitemap within the site root.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Change frequency written for every entry.
pub const CHANGE_FREQ: &str = "monthly";

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    /// URL location.
    pub loc: String,

    /// Last modification date, `YYYY-MM-DD`.
    pub lastmod: String,

    /// Priority (0.0 to 1.0).
    pub priority: f32,
}

/// Sitemap generator.
#[derive(Debug, Default)]
pub struct SitemapGenerator;

impl SitemapGenerator {
    /// Create a new sitemap generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generate sitemap XML from URL entries, in the given order.
    ///
    /// Every element sits on its own unindented line.
    #[must_use]
    pub fn generate(&self, urls: &[SitemapUrl]) -> String {
        debug!(count = urls.len(), "generating sitemap");

        let entries: Vec<String> = urls.iter().map(Self::url_to_xml).collect();
        let lines = [
            r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#.to_string(),
            entries.join("\n"),
            "</urlset>".to_string(),
        ];
        lines.join("\n") + "\n"
    }

    /// Convert a URL entry to XML.
    fn url_to_xml(url: &SitemapUrl) -> String {
        [
            "<url>".to_string(),
            format!("<loc>{}</loc>", escape_xml(&url.loc)),
            format!("<lastmod>{}</lastmod>", escape_xml(&url.lastmod)),
            format!("<changefreq>{CHANGE_FREQ}</changefreq>"),
            format!("<priority>{:.1}</priority>", url.priority),
            "</url>".to_string(),
        ]
        .join("\n")
    }

    /// Write the sitemap to `path` unless it already holds the same text.
    pub fn write_file(&self, urls: &[SitemapUrl], path: &Path) -> std::io::Result<WriteOutcome> {
        write_if_changed(path, &self.generate(urls))
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
