//! sitestamp Generator Library
//!
//! Builds the index, category pages, and sitemap of a hand-written HTML site.
//!
//! # Modules
//!
//! - [`dom`] - Queries over parsed HTML documents
//! - [`template`] - HTML template system with variable interpolation
//! - [`html`] - Anchors and link lists for generated pages
//! - [`output`] - Write-if-changed output files
//! - [`page`] - Articles, categories, and indexes
//! - [`category`] - Category graph extraction and consistency checks
//! - [`sitemap`] - XML sitemap generation
//! - [`assets`] - Bundled stylesheet and script
//! - [`build`] - Build context and orchestration

pub mod assets;
pub mod build;
pub mod category;
pub mod dom;
pub mod html;
pub mod output;
pub mod page;
pub mod sitemap;
pub mod template;

pub use build::{BuildContext, BuildError, BuildStats, Builder, SiteIndex};
pub use category::{CategoryGraph, CategoryLink};
pub use output::WriteOutcome;
pub use page::{Page, PageKind};
pub use sitemap::SitemapGenerator;
pub use template::{Template, TemplateContext, TemplateSet};
