//! Content signatures for change detection.
//!
//! A signature is a character count taken over page text. The normalized
//! strategy first collapses newline runs after closing tags, so reflowing a
//! page by adding or removing blank lines does not count as a change.

use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Closing tags of these elements keep a single trailing newline; every other
/// closing tag absorbs the newlines that follow it.
pub const INLINE_TAGS: &[&str] = &["a", "code", "span"];

static CLOSING_TAG_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</([A-Za-z][A-Za-z0-9]*)>(?:\r?\n)+").expect("valid closing tag pattern")
});

/// How a page's signature is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureStrategy {
    /// Character count of the whitespace-normalized text.
    #[default]
    Normalized,
    /// Character count of the raw text. Matches ledgers written before
    /// normalization existed.
    RawLength,
}

impl SignatureStrategy {
    /// Compute the signature of `text`.
    ///
    /// Line endings are unified to `\n` first, so a page counts the same
    /// whether it was saved with LF, CRLF, or CR line endings.
    pub fn signature(&self, text: &str) -> usize {
        let text = unify_line_endings(text);
        match self {
            Self::Normalized => normalize(&text).chars().count(),
            Self::RawLength => text.chars().count(),
        }
    }
}

/// Replace `\r\n` and lone `\r` with `\n`.
pub fn unify_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Collapse newline runs after closing tags.
///
/// Inline closing tags (see [`INLINE_TAGS`]) keep exactly one newline, all
/// other closing tags keep none.
pub fn normalize(text: &str) -> Cow<'_, str> {
    CLOSING_TAG_NEWLINES.replace_all(text, |caps: &Captures<'_>| {
        let tag = &caps[1];
        if is_inline(tag) {
            format!("</{tag}>\n")
        } else {
            format!("</{tag}>")
        }
    })
}

fn is_inline(tag: &str) -> bool {
    INLINE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}
