//! Read-only queries over a parsed HTML document.
//!
//! Wraps [`scraper::Html`] with the handful of lookups page evaluation needs:
//! by tag, by attribute, and by class, plus text and attribute reads.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static ANY_ELEMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*").expect("universal selector"));

/// A parsed HTML document.
#[derive(Debug)]
pub struct Dom {
    html: Html,
}

impl Dom {
    /// Parse a full HTML document.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// First element with the given tag name, in document order.
    pub fn find_first_by_tag(&self, tag: &str) -> Option<Element<'_>> {
        self.elements().find(|e| e.is(tag))
    }

    /// All elements with the given tag name.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<Element<'_>> {
        self.elements().filter(|e| e.is(tag)).collect()
    }

    /// All elements that carry `attribute`, whatever its value.
    pub fn find_all_with_attribute(&self, attribute: &str) -> Vec<Element<'_>> {
        self.elements()
            .filter(|e| e.attr(attribute).is_some())
            .collect()
    }

    /// First element whose class list contains `class`.
    pub fn find_by_class(&self, class: &str) -> Option<Element<'_>> {
        self.elements().find(|e| e.has_class(class))
    }

    /// Text of the `<title>` element.
    pub fn title(&self) -> Option<String> {
        self.find_first_by_tag("title").map(|e| e.text())
    }

    fn elements(&self) -> impl Iterator<Item = Element<'_>> {
        self.html.select(&ANY_ELEMENT).map(Element)
    }
}

/// An element inside a [`Dom`].
#[derive(Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> &'a str {
        self.0.value().name()
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text(&self) -> String {
        self.0.text().collect()
    }

    /// Descendants with the given tag name.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<Element<'a>> {
        self.0
            .select(&ANY_ELEMENT)
            .map(Element)
            .filter(|e| e.0 != self.0 && e.is(tag))
            .collect()
    }

    fn is(&self, tag: &str) -> bool {
        self.tag().eq_ignore_ascii_case(tag)
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.value().classes().any(|c| c == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Hello - Site</title></head>
<body>
<h1>Hello <code>world</code></h1>
<div class="item categories">
<a href="../categories/foo.html">foo</a>
<a href="../categories/bar.html">bar</a>
</div>
<p style="color: red">styled</p>
<a href="https://example.com" target="_blank">out</a>
</body>
</html>
"#;

    #[test]
    fn test_first_by_tag_text() {
        let dom = Dom::parse(PAGE);
        let h1 = dom.find_first_by_tag("h1").unwrap();
        assert_eq!(h1.text(), "Hello world");
    }

    #[test]
    fn test_title() {
        let dom = Dom::parse(PAGE);
        assert_eq!(dom.title().as_deref(), Some("Hello - Site"));
    }

    #[test]
    fn test_missing_title() {
        let dom = Dom::parse("<h1>No head</h1>");
        assert!(dom.title().is_none());
    }

    #[test]
    fn test_find_all_with_attribute() {
        let dom = Dom::parse(PAGE);
        let styled = dom.find_all_with_attribute("style");
        assert_eq!(styled.len(), 1);
        assert_eq!(styled[0].tag(), "p");
    }

    #[test]
    fn test_find_by_class_and_links() {
        let dom = Dom::parse(PAGE);
        let container = dom.find_by_class("categories").unwrap();
        let links = container.find_all_by_tag("a");

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].text(), "foo");
        assert_eq!(links[0].attr("href"), Some("../categories/foo.html"));
        assert_eq!(links[1].text(), "bar");
    }

    #[test]
    fn test_find_all_by_tag() {
        let dom = Dom::parse(PAGE);
        let links = dom.find_all_by_tag("a");
        assert_eq!(links.len(), 3);
        assert_eq!(links[2].attr("target"), Some("_blank"));
    }
}
