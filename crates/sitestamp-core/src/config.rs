//! Site configuration management.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    signature::SignatureStrategy,
};

/// Main configuration structure for sitestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Timestamp ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Sitemap settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Bundled asset targets.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Index roots built within the site. Empty means a single subsite at
    /// the site root.
    #[serde(default)]
    pub subsites: Vec<SubsiteConfig>,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Root directory of the site files. Relative paths are resolved against
    /// the directory holding the configuration file.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Prefix for absolute page URLs (e.g., "https://example.com/").
    /// Empty yields site-relative URLs.
    #[serde(default)]
    pub domain: String,

    /// Site name, used when no subsites are configured.
    #[serde(default)]
    pub name: Option<String>,

    /// Allow-list for the site root directory. Unset skips the check.
    #[serde(default)]
    pub layout: Option<LayoutConfig>,
}

/// Files and subdirectories permitted in a directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub subdirs: Vec<String>,
}

/// Timestamp ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger file, relative to the site root.
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,

    /// Maintenance mode: keep recorded timestamps even when content changed.
    #[serde(default)]
    pub keep_timestamps: bool,

    /// Signature strategy the ledger was written with.
    #[serde(default)]
    pub signature: SignatureStrategy,
}

/// Sitemap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Whether `sitemap.xml` is written.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Targets for the bundled stylesheet and script, relative to the site root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default)]
    pub style_css: Option<PathBuf>,

    #[serde(default)]
    pub funcs_js: Option<PathBuf>,
}

/// One index root with its own articles, categories, and templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsiteConfig {
    /// Directory relative to the site root.
    #[serde(default = "default_subsite_path")]
    pub path: PathBuf,

    /// Name expected in `<title>` tags. Unset skips the title check.
    #[serde(default)]
    pub name: Option<String>,

    /// Template directory relative to the subsite directory.
    #[serde(default = "default_templates")]
    pub templates: PathBuf,

    /// Number of entries in the recent-articles list.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Extra variables passed to the index and category templates.
    #[serde(default)]
    pub extra_context: BTreeMap<String, String>,

    /// Allow-list for the subsite directory. Unset skips the check.
    #[serde(default)]
    pub layout: Option<LayoutConfig>,
}

// Default value functions
fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("last_counts.toml")
}

fn default_true() -> bool {
    true
}

fn default_subsite_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_templates() -> PathBuf {
    PathBuf::from("templates")
}

fn default_recent_limit() -> usize {
    10
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            domain: String::new(),
            name: None,
            layout: None,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            keep_timestamps: false,
            signature: SignatureStrategy::default(),
        }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for SubsiteConfig {
    fn default() -> Self {
        Self {
            path: default_subsite_path(),
            name: None,
            templates: default_templates(),
            recent_limit: default_recent_limit(),
            extra_context: BTreeMap::new(),
            layout: None,
        }
    }
}

impl Config {
    /// Create a configuration with defaults for a site at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            site: SiteConfig {
                root: root.into(),
                ..SiteConfig::default()
            },
            ledger: LedgerConfig::default(),
            sitemap: SitemapConfig::default(),
            assets: AssetsConfig::default(),
            subsites: Vec::new(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.resolve_root(path);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `SITESTAMP__SECTION__KEY` environment
    /// overrides on top of the file.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("SITESTAMP").separator("__"))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.resolve_root(path);
        config.validate()?;
        Ok(config)
    }

    fn resolve_root(&mut self, config_path: &Path) {
        if self.site.root.is_relative() {
            let base = config_path.parent().unwrap_or(Path::new(""));
            self.site.root = base.join(&self.site.root);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.ledger.path.as_os_str().is_empty() {
            return Err(CoreError::config("ledger.path cannot be empty"));
        }

        let mut seen = HashSet::new();
        for subsite in self.subsites() {
            if subsite.recent_limit == 0 {
                return Err(CoreError::config(format!(
                    "subsite {}: recent_limit must be greater than zero",
                    subsite.path.display()
                )));
            }
            if !seen.insert(subsite.path.clone()) {
                return Err(CoreError::config(format!(
                    "subsite {} is configured twice",
                    subsite.path.display()
                )));
            }
        }

        if !self.site.domain.is_empty() && !self.site.domain.ends_with('/') {
            tracing::warn!(domain = %self.site.domain, "site.domain should end with a slash");
        }

        Ok(())
    }

    /// Configured subsites, or a single one at the site root named after the
    /// site.
    #[must_use]
    pub fn subsites(&self) -> Vec<SubsiteConfig> {
        if self.subsites.is_empty() {
            vec![SubsiteConfig {
                name: self.site.name.clone(),
                ..SubsiteConfig::default()
            }]
        } else {
            self.subsites.clone()
        }
    }

    /// Absolute location of the ledger file.
    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.site.root.join(&self.ledger.path)
    }

    /// Public URL for a site-relative path.
    #[must_use]
    pub fn url_for(&self, relative_path: &str) -> String {
        format!("{}{}", self.site.domain, relative_path)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
root = "public"
domain = "https://example.com/"

[ledger]
path = "data/last_counts.toml"
keep_timestamps = true
signature = "raw-length"

[sitemap]
enabled = false

[assets]
style_css = "style.css"

[[subsites]]
path = "."
name = "Cookie Box"

[[subsites]]
path = "en"
name = "Cookie Box EN"
templates = "../templates/en"
recent_limit = 5
[subsites.extra_context]
lang = "en"
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("sitestamp.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.root, dir.path().join("public"));
        assert_eq!(config.site.domain, "https://example.com/");
        assert!(config.ledger.keep_timestamps);
        assert_eq!(config.ledger.signature, SignatureStrategy::RawLength);
        assert_eq!(
            config.ledger_path(),
            dir.path().join("public").join("data/last_counts.toml")
        );
        assert!(!config.sitemap.enabled);
        assert_eq!(config.assets.style_css, Some(PathBuf::from("style.css")));
        assert_eq!(config.assets.funcs_js, None);

        let subsites = config.subsites();
        assert_eq!(subsites.len(), 2);
        assert_eq!(subsites[0].name.as_deref(), Some("Cookie Box"));
        assert_eq!(subsites[0].recent_limit, 10);
        assert_eq!(subsites[1].path, PathBuf::from("en"));
        assert_eq!(subsites[1].recent_limit, 5);
        assert_eq!(subsites[1].extra_context.get("lang").map(String::as_str), Some("en"));
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("sitestamp.toml");
        let minimal_config = r#"
[site]
name = "Minimal Site"
"#;
        std::fs::write(&config_path, minimal_config).expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.root, dir.path().join("."));
        assert_eq!(config.site.domain, "");
        assert_eq!(config.ledger.path, PathBuf::from("last_counts.toml"));
        assert!(!config.ledger.keep_timestamps);
        assert_eq!(config.ledger.signature, SignatureStrategy::Normalized);
        assert!(config.sitemap.enabled);

        let subsites = config.subsites();
        assert_eq!(subsites.len(), 1);
        assert_eq!(subsites[0].path, PathBuf::from("."));
        assert_eq!(subsites[0].name.as_deref(), Some("Minimal Site"));
        assert_eq!(subsites[0].templates, PathBuf::from("templates"));
    }

    #[test]
    fn test_url_for() {
        let mut config = Config::new("/site");
        config.site.domain = "https://example.com/".to_string();

        assert_eq!(
            config.url_for("articles/a.html"),
            "https://example.com/articles/a.html"
        );
    }

    #[test]
    fn test_url_for_without_domain() {
        let config = Config::new("/site");
        assert_eq!(config.url_for("index.html"), "index.html");
    }

    #[test]
    fn test_validation_zero_recent_limit() {
        let mut config = Config::new("/site");
        config.subsites.push(SubsiteConfig {
            recent_limit: 0,
            ..SubsiteConfig::default()
        });

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("recent_limit"));
    }

    #[test]
    fn test_validation_duplicate_subsite() {
        let mut config = Config::new("/site");
        config.subsites.push(SubsiteConfig::default());
        config.subsites.push(SubsiteConfig::default());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("configured twice"));
    }

    #[test]
    fn test_validation_empty_ledger_path() {
        let mut config = Config::new("/site");
        config.ledger.path = PathBuf::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/sitestamp.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_load_with_env_reads_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("sitestamp.toml");
        std::fs::write(
            &config_path,
            r#"
[site]
domain = "https://example.org/"
"#,
        )
        .expect("write");

        let config = Config::load_with_env(&config_path).expect("load config");
        assert_eq!(config.site.domain, "https://example.org/");
        assert!(config.sitemap.enabled);
    }
}
