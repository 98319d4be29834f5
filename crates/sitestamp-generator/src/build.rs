//! Build orchestration.
//!
//! A build runs inside a [`BuildContext`], which owns the configuration and
//! the timestamp ledger. Each subsite goes through the same stages in order:
//! discover articles, build category pages, verify no orphaned category
//! pages remain, build the index. The sitemap covers every subsite and the
//! ledger is persisted only once everything succeeded.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use sitestamp_core::{
    Config, CoreError, SignatureStrategy, SubsiteConfig, TimestampLedger,
    config::LayoutConfig,
    guard::{validate, validate_and_collect},
    paths::normalize_lexically,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    assets::{AssetError, sync_assets},
    category::{CATEGORIES_DIR, CategoryGraph, category_links},
    html::list_of_links,
    output::WriteOutcome,
    page::{Page, PageError, PageKind},
    sitemap::{SITEMAP_FILE, SitemapGenerator, SitemapUrl},
    template::{TemplateContext, TemplateError, TemplateSet},
};

/// Directory of hand-written articles within a subsite.
pub const ARTICLES_DIR: &str = "articles";

/// File name of a subsite's index page.
pub const INDEX_FILE: &str = "index.html";

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Layout, structure, consistency, or ledger error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Page evaluation or generation error.
    #[error(transparent)]
    Page(#[from] PageError),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of subsites built.
    pub subsites: usize,

    /// Number of articles evaluated.
    pub articles: usize,

    /// Number of category pages generated.
    pub categories: usize,

    /// Number of output files created or updated.
    pub written: usize,

    /// Number of output files left untouched.
    pub unchanged: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

impl BuildStats {
    fn record(&mut self, outcome: WriteOutcome) {
        if outcome.wrote() {
            self.written += 1;
        } else {
            self.unchanged += 1;
        }
    }
}

/// Scoped owner of the configuration and the ledger for one build.
#[derive(Debug)]
pub struct BuildContext {
    config: Config,
    site_root: PathBuf,
    ledger_path: PathBuf,
    ledger: TimestampLedger,
}

impl BuildContext {
    /// Open a context. The site root must exist and the ledger file must
    /// already be present.
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with(config, false)
    }

    /// Open a context, starting from an empty ledger when the file is missing
    /// and `create_missing_ledger` is set.
    pub fn open_with(config: Config, create_missing_ledger: bool) -> Result<Self> {
        let site_root = fs::canonicalize(&config.site.root).map_err(|e| {
            CoreError::config_with_source(
                format!("site root {} is not accessible", config.site.root.display()),
                e,
            )
        })?;
        let ledger_path = site_root.join(&config.ledger.path);

        let ledger = if create_missing_ledger && !ledger_path.exists() {
            warn!(path = %ledger_path.display(), "ledger file not found, starting a new one");
            TimestampLedger::new()
        } else {
            TimestampLedger::load(&ledger_path)?
        };

        Ok(Self {
            config,
            site_root,
            ledger_path,
            ledger,
        })
    }

    /// Open a context, run `body`, and persist the ledger if `body` succeeded.
    /// On error the ledger file is left as it was.
    pub fn run<T>(config: Config, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        Self::open(config)?.run_scoped(body)
    }

    /// Run `body` against this context and persist the ledger if it succeeded.
    pub fn run_scoped<T>(mut self, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let value = body(&mut self)?;
        self.commit()?;
        Ok(value)
    }

    /// Persist the ledger.
    pub fn commit(self) -> Result<()> {
        self.ledger.dump(&self.ledger_path)?;
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Canonical site root.
    #[must_use]
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    #[must_use]
    pub fn ledger(&self) -> &TimestampLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut TimestampLedger {
        &mut self.ledger
    }

    #[must_use]
    pub fn signature_strategy(&self) -> SignatureStrategy {
        self.config.ledger.signature
    }

    #[must_use]
    pub fn keep_timestamps(&self) -> bool {
        self.config.ledger.keep_timestamps
    }
}

/// The pages of one subsite after a build.
#[derive(Debug)]
pub struct SiteIndex {
    pub index: Page,
    /// Sorted by title.
    pub articles: Vec<Page>,
    /// Sorted by name.
    pub categories: Vec<Page>,
}

impl SiteIndex {
    /// Index, then articles, then categories.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        std::iter::once(&self.index)
            .chain(&self.articles)
            .chain(&self.categories)
    }
}

/// Articles of a subsite and the categories they reference.
struct Discovered {
    articles: Vec<Page>,
    graph: CategoryGraph,
}

/// Site builder that orchestrates the build process.
#[derive(Debug)]
pub struct Builder {
    config: Config,
    create_missing_ledger: bool,
}

impl Builder {
    /// Create a new builder.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            create_missing_ledger: false,
        }
    }

    /// Start from an empty ledger when the ledger file does not exist yet.
    #[must_use]
    pub fn with_new_ledger(mut self, create: bool) -> Self {
        self.create_missing_ledger = create;
        self
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let ctx = BuildContext::open_with(self.config.clone(), self.create_missing_ledger)?;

        info!(root = %ctx.site_root().display(), "starting build");

        let mut stats = ctx.run_scoped(build_site)?;
        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            subsites = stats.subsites,
            articles = stats.articles,
            categories = stats.categories,
            written = stats.written,
            unchanged = stats.unchanged,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Validate the site without rendering anything or persisting the ledger.
    ///
    /// Layouts, templates, articles, the category graph, and existing
    /// category pages are checked.
    pub fn check(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut ctx = BuildContext::open_with(self.config.clone(), self.create_missing_ledger)?;
        let mut stats = BuildStats::default();

        check_layout(ctx.site_root(), ctx.config().site.layout.as_ref())?;

        for subsite in ctx.config().subsites() {
            let root = subsite_root(&ctx, &subsite);
            info!(subsite = %root.display(), "checking subsite");

            check_layout(&root, subsite.layout.as_ref())?;
            TemplateSet::load(&root.join(&subsite.templates))?;

            let discovered = discover(&mut ctx, &root, subsite.name.as_deref())?;
            discovered.graph.verify_no_orphans(&root.join(CATEGORIES_DIR))?;

            stats.subsites += 1;
            stats.articles += discovered.articles.len();
            stats.categories += discovered.graph.len();
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            subsites = stats.subsites,
            articles = stats.articles,
            categories = stats.categories,
            "check complete"
        );
        Ok(stats)
    }
}

/// Build every subsite and the sitemap.
pub fn build_site(ctx: &mut BuildContext) -> Result<BuildStats> {
    let mut stats = BuildStats::default();

    check_layout(ctx.site_root(), ctx.config().site.layout.as_ref())?;

    for outcome in sync_assets(&ctx.config().assets, ctx.site_root())? {
        stats.record(outcome);
    }

    let mut sites = Vec::new();
    for subsite in ctx.config().subsites() {
        let site = build_subsite(ctx, &subsite, &mut stats)?;
        sites.push(site);
    }

    if ctx.config().sitemap.enabled {
        info!("generating sitemap");
        let urls: Vec<SitemapUrl> = sites
            .iter()
            .flat_map(SiteIndex::pages)
            .map(Page::as_sitemap_entry)
            .collect();
        let outcome = SitemapGenerator::new().write_file(&urls, &ctx.site_root().join(SITEMAP_FILE))?;
        stats.record(outcome);
    }

    Ok(stats)
}

/// Build one subsite: its category pages and its index.
pub fn build_subsite(
    ctx: &mut BuildContext,
    subsite: &SubsiteConfig,
    stats: &mut BuildStats,
) -> Result<SiteIndex> {
    let root = subsite_root(ctx, subsite);
    let name = subsite.name.as_deref();
    info!(subsite = %root.display(), "building subsite");

    check_layout(&root, subsite.layout.as_ref())?;
    let templates = TemplateSet::load(&root.join(&subsite.templates))?;

    info!("collecting articles");
    let Discovered { articles, graph } = discover(ctx, &root, name)?;

    // Stable: equal timestamps keep title order.
    let mut recent: Vec<usize> = (0..articles.len()).collect();
    recent.sort_by(|&a, &b| articles[b].timestamp.cmp(&articles[a].timestamp));

    info!("generating category pages");
    let mut categories = Vec::with_capacity(graph.len());
    for node in graph.iter() {
        // Indices follow the title order of `articles`.
        let mut members = node.members.clone();
        members.sort_unstable();

        let mut page = Page::new(
            ctx,
            node.path.clone(),
            PageKind::Category {
                name: node.name.clone(),
                members: members.clone(),
            },
        );
        let context = TemplateContext::new()
            .with_var("category_name", node.name.clone())
            .with_var("n_articles", members.len().to_string())
            .with_var(
                "list_article",
                list_of_links(members.iter().map(|&i| &articles[i]), &page.path, true, None),
            )
            .extend(&subsite.extra_context);

        let outcome = page.generate(ctx, &templates.category, &context, name)?;
        stats.record(outcome);
        categories.push(page);
    }

    graph.verify_no_orphans(&root.join(CATEGORIES_DIR))?;

    info!("generating index page");
    let index_path = root.join(INDEX_FILE);
    let context = TemplateContext::new()
        .with_var("n_article", articles.len().to_string())
        .with_var("list_article", list_of_links(&articles, &index_path, true, None))
        .with_var(
            "list_article_recent",
            list_of_links(
                recent.iter().map(|&i| &articles[i]),
                &index_path,
                true,
                Some(subsite.recent_limit),
            ),
        )
        .with_var("n_category", categories.len().to_string())
        .with_var("list_category", list_of_links(&categories, &index_path, false, None))
        .extend(&subsite.extra_context);

    let mut index = Page::new(ctx, index_path, PageKind::Index);
    let outcome = index.generate(ctx, &templates.index, &context, name)?;
    stats.record(outcome);

    stats.subsites += 1;
    stats.articles += articles.len();
    stats.categories += categories.len();

    Ok(SiteIndex {
        index,
        articles,
        categories,
    })
}

/// Evaluate every article of a subsite and feed the category graph in title
/// order.
fn discover(ctx: &mut BuildContext, root: &Path, name: Option<&str>) -> Result<Discovered> {
    let mut paths = validate_and_collect(&root.join(ARTICLES_DIR), &[], &[], true)?;
    paths.sort();

    let mut articles = Vec::with_capacity(paths.len());
    for path in paths {
        let mut page = Page::new(ctx, path, PageKind::Article { categories: Vec::new() });
        let dom = page.evaluate(ctx, name)?;
        page.kind = PageKind::Article {
            categories: category_links(&dom, &page.path)?,
        };
        articles.push(page);
    }
    articles.sort_by(|a, b| a.title.cmp(&b.title));

    let mut graph = CategoryGraph::new();
    for (index, article) in articles.iter().enumerate() {
        if let PageKind::Article { categories } = &article.kind {
            graph.add_article(index, &article.path, categories)?;
        }
    }

    debug!(articles = articles.len(), categories = graph.len(), "discovered");
    Ok(Discovered { articles, graph })
}

fn subsite_root(ctx: &BuildContext, subsite: &SubsiteConfig) -> PathBuf {
    normalize_lexically(&ctx.site_root().join(&subsite.path))
}

fn check_layout(dir: &Path, layout: Option<&LayoutConfig>) -> Result<()> {
    let Some(layout) = layout else {
        return Ok(());
    };
    let files: Vec<&str> = layout.files.iter().map(String::as_str).collect();
    let subdirs: Vec<&str> = layout.subdirs.iter().map(String::as_str).collect();
    validate(dir, &files, &subdirs)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const INDEX_TEMPLATE: &str = "<html><head><title>Site</title></head><body><h1>Home</h1>\n{{ list_article }}\n{{ list_category }}\n</body></html>";
    const CATEGORY_TEMPLATE: &str = "<html><head><title>{{ category_name }} - Site</title></head><body><h1>{{ category_name }}</h1>\n{{ list_article }}\n</body></html>";

    fn site() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("articles")).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(root.join("templates/index_template.html"), INDEX_TEMPLATE).unwrap();
        fs::write(root.join("templates/category_template.html"), CATEGORY_TEMPLATE).unwrap();
        TimestampLedger::new().dump(&root.join("last_counts.toml")).unwrap();

        let mut config = Config::new(root);
        config.site.name = Some("Site".to_string());
        (dir, config)
    }

    fn write_article(root: &Path, file: &str, title: &str, categories: &[&str]) {
        let links: String = categories
            .iter()
            .map(|c| format!(r#"<a href="../categories/{c}.html">{c}</a>"#))
            .collect();
        fs::write(
            root.join("articles").join(file),
            format!(
                "<html><head><title>{title} - Site</title></head><body><h1>{title}</h1><div class=\"categories\">{links}</div></body></html>"
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_build_counts() {
        let (dir, config) = site();
        write_article(dir.path(), "a.html", "Alpha", &["rust", "web"]);
        write_article(dir.path(), "b.html", "Beta", &["rust"]);

        let stats = Builder::new(config).build().unwrap();

        assert_eq!(stats.subsites, 1);
        assert_eq!(stats.articles, 2);
        assert_eq!(stats.categories, 2);
        // Two categories, the index, and the sitemap.
        assert_eq!(stats.written, 4);
        assert!(dir.path().join("categories/rust.html").is_file());
        assert!(dir.path().join("categories/web.html").is_file());
        assert!(dir.path().join("index.html").is_file());
        assert!(dir.path().join(SITEMAP_FILE).is_file());
    }

    #[test]
    fn test_second_build_writes_nothing() {
        let (dir, config) = site();
        write_article(dir.path(), "a.html", "Alpha", &["rust"]);

        Builder::new(config.clone()).build().unwrap();
        let stats = Builder::new(config).build().unwrap();

        assert_eq!(stats.written, 0);
        assert_eq!(stats.unchanged, 3);
    }

    #[test]
    fn test_missing_ledger_is_fatal() {
        let (dir, config) = site();
        fs::remove_file(dir.path().join("last_counts.toml")).unwrap();

        let err = Builder::new(config).build().unwrap_err();
        assert!(matches!(err, BuildError::Core(CoreError::Ledger { .. })));
    }

    #[test]
    fn test_new_ledger_created() {
        let (dir, config) = site();
        fs::remove_file(dir.path().join("last_counts.toml")).unwrap();
        write_article(dir.path(), "a.html", "Alpha", &[]);

        Builder::new(config).with_new_ledger(true).build().unwrap();

        let ledger = TimestampLedger::load(&dir.path().join("last_counts.toml")).unwrap();
        assert!(ledger.get("articles/a.html").is_some());
        assert!(ledger.get("index.html").is_some());
    }

    #[test]
    fn test_orphaned_category_page() {
        let (dir, config) = site();
        write_article(dir.path(), "a.html", "Alpha", &["rust"]);
        fs::create_dir_all(dir.path().join("categories")).unwrap();
        fs::write(dir.path().join("categories/old.html"), "").unwrap();

        let err = Builder::new(config).build().unwrap_err();
        assert!(err.to_string().contains("orphaned category page"));
    }

    #[test]
    fn test_site_layout_enforced() {
        let (dir, mut config) = site();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        config.site.layout = Some(LayoutConfig {
            files: vec!["index.html".to_string(), "last_counts.toml".to_string()],
            subdirs: vec!["articles".to_string(), "templates".to_string()],
        });

        let err = Builder::new(config).build().unwrap_err();
        assert!(matches!(err, BuildError::Core(CoreError::Layout { .. })));
    }

    #[test]
    fn test_check_writes_nothing() {
        let (dir, config) = site();
        write_article(dir.path(), "a.html", "Alpha", &["rust"]);
        let ledger_before = fs::read_to_string(dir.path().join("last_counts.toml")).unwrap();

        let stats = Builder::new(config).check().unwrap();

        assert_eq!(stats.articles, 1);
        assert_eq!(stats.categories, 1);
        assert!(!dir.path().join("index.html").exists());
        assert!(!dir.path().join("categories").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("last_counts.toml")).unwrap(),
            ledger_before
        );
    }

    #[test]
    fn test_run_skips_commit_on_error() {
        let (dir, config) = site();
        let ledger_path = dir.path().join("last_counts.toml");
        let before = fs::read_to_string(&ledger_path).unwrap();

        let result: Result<()> = BuildContext::run(config, |ctx| {
            ctx.ledger_mut().resolve("articles/x.html", 1, "2025-01-01", false);
            Err(CoreError::structure("articles/x.html", "boom").into())
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&ledger_path).unwrap(), before);
    }

    #[test]
    fn test_run_commits_on_success() {
        let (dir, config) = site();

        BuildContext::run(config, |ctx| {
            ctx.ledger_mut().resolve("articles/x.html", 1, "2025-01-01", false);
            Ok(())
        })
        .unwrap();

        let ledger = TimestampLedger::load(&dir.path().join("last_counts.toml")).unwrap();
        assert_eq!(
            ledger.get("articles/x.html").unwrap().timestamp.as_deref(),
            Some("2025-01-01")
        );
    }
}
