//! Shared stylesheet and script bundled with the builder.
//!
//! Each resource is written to the path configured for it under the site
//! root. Unset paths are skipped.

use std::path::{Path, PathBuf};

use sitestamp_core::config::AssetsConfig;
use thiserror::Error;
use tracing::info;

use crate::output::{WriteOutcome, write_if_changed};

/// Bundled stylesheet.
pub const STYLE_CSS: &str = include_str!("../resources/style.css");

/// Bundled script.
pub const FUNCS_JS: &str = include_str!("../resources/funcs.js");

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid asset path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Write the configured bundled resources under `site_root`. Returns the
/// outcome for every resource that has a target.
pub fn sync_assets(assets: &AssetsConfig, site_root: &Path) -> Result<Vec<WriteOutcome>> {
    let targets = [
        (assets.style_css.as_deref(), STYLE_CSS),
        (assets.funcs_js.as_deref(), FUNCS_JS),
    ];

    let mut outcomes = Vec::new();
    for (target, contents) in targets {
        let Some(target) = target else {
            continue;
        };
        if target.is_absolute() || target.as_os_str().is_empty() {
            return Err(AssetError::InvalidPath(target.to_path_buf()));
        }

        let path = site_root.join(target);
        let outcome = write_if_changed(&path, contents).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        outcomes.push(outcome);
    }

    info!(count = outcomes.len(), "synced assets");
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_sync_configured_assets() {
        let dir = TempDir::new().unwrap();
        let assets = AssetsConfig {
            style_css: Some(PathBuf::from("style.css")),
            funcs_js: Some(PathBuf::from("js/funcs.js")),
        };

        let outcomes = sync_assets(&assets, dir.path()).unwrap();

        assert_eq!(outcomes, vec![WriteOutcome::Created, WriteOutcome::Created]);
        assert_eq!(fs::read_to_string(dir.path().join("style.css")).unwrap(), STYLE_CSS);
        assert_eq!(fs::read_to_string(dir.path().join("js/funcs.js")).unwrap(), FUNCS_JS);
    }

    #[test]
    fn test_bundled_script_provides_page_helpers() {
        for function in [
            "function createSidebar(",
            "function setButton(",
            "function setButtonOpenClose(",
            "function loadMathJax(",
            "function secureExternalLinks(",
            "function init(",
            "Prism.hooks.add(",
        ] {
            assert!(FUNCS_JS.contains(function), "funcs.js lacks {function}");
        }
    }

    #[test]
    fn test_sync_overwrites_local_edits() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();
        let assets = AssetsConfig {
            style_css: Some(PathBuf::from("style.css")),
            funcs_js: None,
        };

        assert_eq!(sync_assets(&assets, dir.path()).unwrap(), vec![WriteOutcome::Updated]);
        assert_eq!(sync_assets(&assets, dir.path()).unwrap(), vec![WriteOutcome::Unchanged]);
    }

    #[test]
    fn test_nothing_configured() {
        let dir = TempDir::new().unwrap();
        assert!(sync_assets(&AssetsConfig::default(), dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_absolute_target_rejected() {
        let dir = TempDir::new().unwrap();
        let assets = AssetsConfig {
            style_css: Some(dir.path().join("style.css")),
            funcs_js: None,
        };

        assert!(matches!(
            sync_assets(&assets, dir.path()),
            Err(AssetError::InvalidPath(_))
        ));
    }
}
