//! HTML fragments for generated pages: anchors, timestamp badges, and link
//! lists handed to templates.

use std::path::Path;

use crate::page::Page;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `<a href="{href}">{text}</a>` with both parts escaped.
#[must_use]
pub fn anchor(href: &str, text: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, escape_html(href), escape_html(text))
}

/// Badge showing a page's last-modified date.
#[must_use]
pub fn timestamp_badge(timestamp: &str) -> String {
    format!(r#"<span class="index-ts">{}</span>"#, escape_html(timestamp))
}

/// Unordered list linking to `pages` from the page at `from`.
///
/// One `<li>` per line, in the given order, stopping after `limit` items when
/// a limit is set.
pub fn list_of_links<'a>(
    pages: impl IntoIterator<Item = &'a Page>,
    from: &Path,
    with_timestamp: bool,
    limit: Option<usize>,
) -> String {
    let mut html = String::from("<ul>\n");
    for page in pages.into_iter().take(limit.unwrap_or(usize::MAX)) {
        html.push_str("<li>");
        html.push_str(&page.as_anchor(from, with_timestamp));
        html.push_str("</li>\n");
    }
    html.push_str("</ul>");
    html
}
