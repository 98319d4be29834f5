//! Directory allow-list validation.
//!
//! A site directory may only contain the files and subdirectories it is
//! expected to contain. Anything else is treated as an authoring mistake and
//! fails the build. Presence of the allowed entries is not checked.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{CoreError, Result};

/// Extension of page files collected from a directory.
pub const PAGE_EXTENSION: &str = "html";

/// Validate the direct children of `dir` and collect page files.
///
/// Subdirectories must appear in `allowed_subdirs`. Files must appear in
/// `allowed_files`, or, when `collect_pages` is set, carry the page extension,
/// in which case they are collected. The returned order follows directory
/// iteration and is not stable.
pub fn validate_and_collect(
    dir: &Path,
    allowed_files: &[&str],
    allowed_subdirs: &[&str],
    collect_pages: bool,
) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if !allowed_subdirs.contains(&name.as_ref()) {
                return Err(CoreError::layout(path, "unexpected subdirectory"));
            }
            continue;
        }

        if allowed_files.contains(&name.as_ref()) {
            continue;
        }

        if collect_pages && is_page(&path) {
            debug!(path = %path.display(), "collected page");
            pages.push(path);
        } else {
            return Err(CoreError::layout(path, "unexpected file"));
        }
    }

    Ok(pages)
}

/// Validate the direct children of `dir` without collecting anything.
pub fn validate(dir: &Path, allowed_files: &[&str], allowed_subdirs: &[&str]) -> Result<()> {
    validate_and_collect(dir, allowed_files, allowed_subdirs, false).map(|_| ())
}

fn is_page(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(PAGE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").expect("write");
    }

    #[test]
    fn test_collects_pages() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.html");
        touch(dir.path(), "b.HTML");

        let mut pages = validate_and_collect(dir.path(), &[], &[], true).unwrap();
        pages.sort();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].ends_with("a.html"));
        assert!(pages[1].ends_with("b.HTML"));
    }

    #[test]
    fn test_allowed_file_is_not_collected() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "post.html");

        let pages = validate_and_collect(dir.path(), &["index.html"], &[], true).unwrap();

        assert_eq!(pages.len(), 1);
        assert!(pages[0].ends_with("post.html"));
    }

    #[test]
    fn test_unexpected_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "notes.txt");

        let err = validate_and_collect(dir.path(), &[], &[], true).unwrap_err();
        assert!(matches!(err, CoreError::Layout { .. }));
        assert!(err.to_string().contains("unexpected file"));
    }

    #[test]
    fn test_page_is_unexpected_without_collection() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "stray.html");

        let err = validate(dir.path(), &["index.html"], &[]).unwrap_err();
        assert!(matches!(err, CoreError::Layout { .. }));
    }

    #[test]
    fn test_unexpected_subdirectory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("drafts")).unwrap();

        let err = validate_and_collect(dir.path(), &[], &["articles"], true).unwrap_err();
        assert!(err.to_string().contains("unexpected subdirectory"));
    }

    #[test]
    fn test_missing_allowed_entries_pass() {
        let dir = TempDir::new().unwrap();

        validate(dir.path(), &["index.html", "sitemap.xml"], &["articles"]).unwrap();
    }
}
