//! Persisted page timestamps.
//!
//! The ledger remembers, for every page, the signature it had when its
//! timestamp was last assigned. A page keeps its timestamp across builds for
//! as long as its signature does not change, so touching a file without
//! editing it does not make it look freshly updated.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};

/// Format of every timestamp stored in the ledger.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One page record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Path of the page relative to the site root, `/`-separated.
    #[serde(rename = "rel_path", alias = "relative_path")]
    pub relative_path: String,

    /// Signature recorded when the timestamp was last assigned.
    #[serde(
        rename = "count",
        alias = "signature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signature: Option<usize>,

    /// Last-modified date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl LedgerEntry {
    fn empty(relative_path: &str) -> Self {
        Self {
            relative_path: relative_path.to_owned(),
            signature: None,
            timestamp: None,
        }
    }
}

/// On-disk shape: a single `[[pages]]` table array.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    pages: Vec<LedgerEntry>,
}

/// Outcome of [`TimestampLedger::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Timestamp the page carries in this build.
    pub timestamp: String,

    /// Signature recorded before this call, if any.
    pub previous_signature: Option<usize>,

    /// Signature passed to this call.
    pub signature: usize,
}

/// In-memory ledger keyed by relative path. Iteration and serialization are
/// sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampLedger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl TimestampLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ledger from a TOML file. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ledger(path, "ledger file not found"));
        }

        let content = fs::read_to_string(path)?;
        let file: LedgerFile = toml::from_str(&content)
            .map_err(|e| CoreError::ledger(path, format!("failed to parse ledger: {e}")))?;

        let mut entries = BTreeMap::new();
        for entry in file.pages {
            if let Some(previous) = entries.insert(entry.relative_path.clone(), entry) {
                warn!(rel_path = %previous.relative_path, "duplicate ledger entry, keeping the last one");
            }
        }

        info!(path = %path.display(), entries = entries.len(), "loaded timestamp ledger");
        Ok(Self { entries })
    }

    /// Write the ledger to `path`, sorted by relative path.
    ///
    /// The text goes to a sibling temporary file first and is then renamed
    /// over `path`, so readers see either the old or the new document.
    pub fn dump(&self, path: &Path) -> Result<()> {
        let file = LedgerFile {
            pages: self.entries.values().cloned().collect(),
        };
        let text = toml::to_string(&file)?.replace("\r\n", "\n");

        let tmp = temporary_path(path);
        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)?;

        info!(path = %path.display(), entries = self.entries.len(), "wrote timestamp ledger");
        Ok(())
    }

    /// Decide the timestamp of a page and update its record.
    ///
    /// Without `keep`, a matching signature keeps the recorded timestamp and
    /// anything else takes `mtime_date`. With `keep`, a recorded timestamp is
    /// always kept. In both modes the stored signature ends up equal to
    /// `signature`.
    pub fn resolve(
        &mut self,
        relative_path: &str,
        signature: usize,
        mtime_date: &str,
        keep: bool,
    ) -> Resolution {
        let entry = self
            .entries
            .entry(relative_path.to_owned())
            .or_insert_with(|| LedgerEntry::empty(relative_path));
        let previous_signature = entry.signature;

        let timestamp = if keep {
            entry.signature = Some(signature);
            entry
                .timestamp
                .get_or_insert_with(|| mtime_date.to_owned())
                .clone()
        } else {
            let unchanged = match (&entry.timestamp, previous_signature) {
                (Some(timestamp), Some(previous)) if previous == signature => {
                    Some(timestamp.clone())
                }
                _ => None,
            };
            match unchanged {
                Some(timestamp) => timestamp,
                None => {
                    entry.signature = Some(signature);
                    entry.timestamp = Some(mtime_date.to_owned());
                    mtime_date.to_owned()
                }
            }
        };

        debug!(rel_path = relative_path, ?previous_signature, signature, %timestamp, keep, "resolved timestamp");

        Resolution {
            timestamp,
            previous_signature,
            signature,
        }
    }

    /// Look up the record for a page.
    #[must_use]
    pub fn get(&self, relative_path: &str) -> Option<&LedgerEntry> {
        self.entries.get(relative_path)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Modification date of a file, formatted with [`DATE_FORMAT`] in local time.
pub fn mtime_date(path: &Path) -> Result<String> {
    let modified = fs::metadata(path)?.modified()?;
    let modified: DateTime<Local> = modified.into();
    Ok(modified.format(DATE_FORMAT).to_string())
}

fn temporary_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ledger".to_owned());
    path.with_file_name(format!(".{name}.tmp"))
}
