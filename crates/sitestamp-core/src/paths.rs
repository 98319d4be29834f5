//! Path arithmetic on absolute paths.
//!
//! Category links may point at files that do not exist yet, so paths are
//! resolved lexically instead of through the file system.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the file system.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Path of `target` relative to the directory `base_dir`, `/`-separated.
///
/// Both paths should be absolute and normalized.
pub fn relative_posix(target: &Path, base_dir: &Path) -> String {
    let target: Vec<_> = target.components().collect();
    let base: Vec<_> = base_dir.components().collect();

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let parts: Vec<String> = std::iter::repeat_n("..".to_owned(), base.len() - common)
        .chain(
            target[common..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .collect();

    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}
