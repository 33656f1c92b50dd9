// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Read-only query interface over a parsed HTML page.
//!
//! The page is parsed once with `scraper` and flattened into owned element
//! snapshots in document order, so analyzers never see the DOM type and the
//! document is `Send + Sync` across await points.

use scraper::{ElementRef, Html};

/// Tags whose text content is captured. Text of container elements is not
/// kept; no check needs it.
const TEXT_TAGS: &[&str] = &[
    "a", "button", "h1", "h2", "h3", "h4", "h5", "h6", "label", "script", "style", "title",
];

/// One element of the page.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    ancestors: Vec<String>,
}

impl Element {
    /// Lower-case tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value, if present (possibly empty).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whitespace-trimmed text content. Empty for tags outside `TEXT_TAGS`.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Whether any enclosing element has the given tag.
    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestors.iter().any(|a| a == tag)
    }
}

/// Parsed page.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
    has_doctype: bool,
}

impl Document {
    /// Parse raw HTML. Never fails; html5ever recovers from any input.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let has_doctype = parsed
            .tree
            .root()
            .children()
            .any(|node| node.value().is_doctype());

        let mut elements = Vec::new();
        for node in parsed.tree.root().descendants() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            let tag = el.value().name().to_ascii_lowercase();
            let attrs = el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect();
            let ancestors = el
                .ancestors()
                .filter_map(ElementRef::wrap)
                .map(|a| a.value().name().to_ascii_lowercase())
                .collect();
            let text = if TEXT_TAGS.contains(&tag.as_str()) {
                el.text().collect::<String>()
            } else {
                String::new()
            };
            elements.push(Element {
                tag,
                attrs,
                text,
                ancestors,
            });
        }

        Self {
            elements,
            has_doctype,
        }
    }

    /// Whether the source declared a DOCTYPE.
    pub fn has_doctype(&self) -> bool {
        self.has_doctype
    }

    /// All elements in document order.
    pub fn all(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Elements with the given tag, in document order.
    pub fn elements<'a, 't>(&'a self, tag: &'t str) -> impl Iterator<Item = &'a Element> + 't
    where
        'a: 't,
    {
        self.elements.iter().filter(move |e| e.tag == tag)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.elements(tag).count()
    }

    pub fn first(&self, tag: &str) -> Option<&Element> {
        self.elements(tag).next()
    }

    /// Elements carrying the given attribute.
    pub fn with_attr<'a, 't>(&'a self, attr: &'t str) -> impl Iterator<Item = &'a Element> + 't
    where
        'a: 't,
    {
        self.elements.iter().filter(move |e| e.has_attr(attr))
    }

    /// First element with `tag` whose `attr` equals `value`.
    pub fn find(&self, tag: &str, attr: &str, value: &str) -> Option<&Element> {
        self.elements(tag).find(|e| e.attr(attr) == Some(value))
    }

    /// The `<html>` element. html5ever always synthesizes one.
    pub fn root(&self) -> Option<&Element> {
        self.first("html")
    }

    /// Non-empty text of the first `<title>`.
    pub fn title(&self) -> Option<String> {
        self.first("title")
            .map(|t| t.text().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Heading tags (`h1`..`h6`) in document order, as levels.
    pub fn heading_levels(&self) -> Vec<u8> {
        self.elements
            .iter()
            .filter_map(|e| heading_level(&e.tag))
            .collect()
    }
}

/// Level of an `h1`..`h6` tag.
pub fn heading_level(tag: &str) -> Option<u8> {
    let rest = tag.strip_prefix('h')?;
    match rest.parse::<u8>() {
        Ok(level @ 1..=6) if rest.len() == 1 => Some(level),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
        <html lang="en"><head><title> Hello </title></head>
        <body>
          <h1>Top</h1><h3>Deep</h3>
          <label>Name <input type="text" name="n"></label>
          <a href="/x">  Read more </a>
          <img src="a.png" alt="">
        </body></html>"#;

    #[test]
    fn test_parse_basic_queries() {
        let doc = Document::parse(PAGE);
        assert!(doc.has_doctype());
        assert_eq!(doc.title().as_deref(), Some("Hello"));
        assert_eq!(doc.root().and_then(|r| r.attr("lang")), Some("en"));
        assert_eq!(doc.count("img"), 1);
        assert_eq!(doc.first("img").and_then(|i| i.attr("alt")), Some(""));
        assert_eq!(doc.first("a").map(|a| a.text()), Some("Read more"));
        assert_eq!(doc.heading_levels(), vec![1, 3]);
    }

    #[test]
    fn test_lookups_outlive_the_tag_argument() {
        let doc = Document::parse(PAGE);
        let img = {
            let tag = String::from("img");
            doc.first(&tag)
        };
        let link = {
            let (tag, attr) = (String::from("a"), String::from("href"));
            doc.find(&tag, &attr, "/x")
        };
        assert_eq!(img.and_then(|i| i.attr("src")), Some("a.png"));
        assert_eq!(link.map(|a| a.text()), Some("Read more"));
    }

    #[test]
    fn test_ancestors() {
        let doc = Document::parse(PAGE);
        let input = doc.first("input").unwrap();
        assert!(input.has_ancestor("label"));
        assert!(input.has_ancestor("body"));
        assert!(!input.has_ancestor("form"));
    }

    #[test]
    fn test_missing_doctype_and_synthesized_root() {
        let doc = Document::parse("<p>fragment</p>");
        assert!(!doc.has_doctype());
        assert!(doc.root().is_some());
        assert!(doc.title().is_none());
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("h10"), None);
        assert_eq!(heading_level("head"), None);
    }
}
