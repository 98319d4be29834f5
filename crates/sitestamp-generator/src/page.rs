//! Pages of a site: articles, categories, and the index.
//!
//! Every page shares one record (location, identity, title, timestamp) and
//! differs only in its [`PageKind`]. Evaluating a page checks its HTML shape
//! and settles its timestamp through the build context's ledger.

use std::{
    fs,
    path::{Path, PathBuf},
};

use sitestamp_core::{CoreError, ledger::mtime_date, paths::relative_posix};
use thiserror::Error;
use tracing::info;

use crate::{
    build::BuildContext,
    category::CategoryLink,
    dom::Dom,
    html,
    output::{WriteOutcome, write_if_changed},
    sitemap::SitemapUrl,
    template::{Template, TemplateContext, TemplateError},
};

/// Page errors.
#[derive(Debug, Error)]
pub enum PageError {
    /// Structure, layout, or ledger error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for page operations.
pub type Result<T> = std::result::Result<T, PageError>;

/// What a page is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// The root page of a subsite.
    Index,

    /// A hand-written article and the categories it declares.
    Article { categories: Vec<CategoryLink> },

    /// A generated category page. Members are indices into the owning
    /// index's article list.
    Category { name: String, members: Vec<usize> },
}

/// One HTML file of the site.
#[derive(Debug, Clone)]
pub struct Page {
    /// Absolute location.
    pub path: PathBuf,

    /// Location relative to the site root, `/`-separated. Unique across the
    /// site; the key into the ledger and the sitemap.
    pub relative_path: String,

    /// Public URL.
    pub url: String,

    /// Text of the first `<h1>`. Empty until evaluated.
    pub title: String,

    /// Last-modified date. Empty until evaluated.
    pub timestamp: String,

    pub kind: PageKind,
}

impl Page {
    /// Create an unevaluated page. `path` must be absolute and normalized.
    #[must_use]
    pub fn new(ctx: &BuildContext, path: PathBuf, kind: PageKind) -> Self {
        let relative_path = relative_posix(&path, ctx.site_root());
        let url = ctx.config().url_for(&relative_path);
        Self {
            path,
            relative_path,
            url,
            title: String::new(),
            timestamp: String::new(),
            kind,
        }
    }

    /// Whether this is a subsite index.
    #[must_use]
    pub fn is_index(&self) -> bool {
        matches!(self.kind, PageKind::Index)
    }

    /// The `<title>` this page must carry within a subsite named `site_name`.
    #[must_use]
    pub fn expected_title(&self, site_name: &str) -> String {
        if self.is_index() {
            site_name.to_owned()
        } else {
            format!("{} - {}", self.title, site_name)
        }
    }

    /// Check the page on disk and settle its title and timestamp.
    ///
    /// Fails on a missing `<h1>`, a `<title>` that does not match
    /// [`Page::expected_title`] (skipped when `site_name` is `None`), any
    /// inline `style` attribute, or any link with a `target`. The parsed
    /// document is returned for further extraction.
    pub fn evaluate(&mut self, ctx: &mut BuildContext, site_name: Option<&str>) -> Result<Dom> {
        let text = fs::read_to_string(&self.path)?;
        let dom = Dom::parse(&text);

        self.title = dom
            .find_first_by_tag("h1")
            .map(|h1| h1.text())
            .ok_or_else(|| CoreError::structure(&self.path, "missing <h1> heading"))?;

        if let Some(site_name) = site_name {
            let expected = self.expected_title(site_name);
            let actual = dom.title();
            if actual.as_deref() != Some(expected.as_str()) {
                return Err(CoreError::structure(
                    &self.path,
                    format!("<title> should be {expected:?}, found {actual:?}"),
                )
                .into());
            }
        }

        if let Some(styled) = dom.find_all_with_attribute("style").first() {
            return Err(CoreError::structure(
                &self.path,
                format!("inline style attribute on <{}>", styled.tag()),
            )
            .into());
        }

        if dom
            .find_all_by_tag("a")
            .iter()
            .any(|a| a.attr("target").is_some())
        {
            return Err(CoreError::structure(&self.path, "link with a target attribute").into());
        }

        let signature = ctx.signature_strategy().signature(&text);
        let mtime = mtime_date(&self.path)?;
        let keep = ctx.keep_timestamps();
        let resolution = ctx
            .ledger_mut()
            .resolve(&self.relative_path, signature, &mtime, keep);
        self.timestamp = resolution.timestamp;

        info!(
            timestamp = %self.timestamp,
            title = %self.title,
            "({} --> {})",
            resolution.previous_signature.unwrap_or(0),
            resolution.signature
        );

        Ok(dom)
    }

    /// Render `template` into this page's file, writing only on change, then
    /// evaluate the result.
    pub fn generate(
        &mut self,
        ctx: &mut BuildContext,
        template: &Template,
        context: &TemplateContext,
        site_name: Option<&str>,
    ) -> Result<WriteOutcome> {
        let mut rendered = template.render(context)?;
        rendered.push('\n');

        let outcome = write_if_changed(&self.path, &rendered)?;
        self.evaluate(ctx, site_name)?;
        Ok(outcome)
    }

    /// Link to this page from the page at `from`, optionally followed by a
    /// timestamp badge.
    #[must_use]
    pub fn as_anchor(&self, from: &Path, with_timestamp: bool) -> String {
        let base = from.parent().unwrap_or(Path::new(""));
        let anchor = html::anchor(&relative_posix(&self.path, base), &self.title);
        if with_timestamp {
            format!("{anchor} {}", html::timestamp_badge(&self.timestamp))
        } else {
            anchor
        }
    }

    /// This page's sitemap record.
    #[must_use]
    pub fn as_sitemap_entry(&self) -> SitemapUrl {
        SitemapUrl {
            loc: self.url.clone(),
            lastmod: self.timestamp.clone(),
            priority: if self.is_index() { 1.0 } else { 0.5 },
        }
    }
}
