//! Output files that are only rewritten when their text changes.
//!
//! Leaving an identical file untouched keeps its modification time, which in
//! turn keeps the page's ledger timestamp stable.

use std::{fs, io, path::Path};

use tracing::info;

/// What [`write_if_changed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist.
    Created,
    /// The file existed with different contents.
    Updated,
    /// The file already held exactly this text.
    Unchanged,
}

impl WriteOutcome {
    /// Whether the file was written.
    #[must_use]
    pub fn wrote(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Write `text` to `path` unless the file already holds it byte for byte.
/// Missing parent directories are created.
pub fn write_if_changed(path: &Path, text: &str) -> io::Result<WriteOutcome> {
    let outcome = match fs::read(path) {
        Ok(current) if current == text.as_bytes() => WriteOutcome::Unchanged,
        Ok(_) => WriteOutcome::Updated,
        Err(e) if e.kind() == io::ErrorKind::NotFound => WriteOutcome::Created,
        Err(e) => return Err(e),
    };

    if outcome.wrote() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
    }

    info!(path = %path.display(), outcome = outcome.as_str(), "output");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_create_update_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/page.html");

        assert_eq!(write_if_changed(&path, "a").unwrap(), WriteOutcome::Created);
        assert_eq!(write_if_changed(&path, "a").unwrap(), WriteOutcome::Unchanged);
        assert_eq!(write_if_changed(&path, "b").unwrap(), WriteOutcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }

    #[test]
    fn test_unchanged_keeps_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        write_if_changed(&path, "same").unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        write_if_changed(&path, "same").unwrap();

        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }
}
