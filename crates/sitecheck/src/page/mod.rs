// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! The fetched page and the outcome of a fetch attempt.

pub mod document;

pub use document::{Document, Element};

use crate::error::FetchErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which tier of the degradation chain delivered the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchTier {
    Browser,
    Http,
}

/// Why a fetch produced no page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub url: String,
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(url: &str, kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            kind,
            message: message.into(),
        }
    }
}

/// Raw material handed from a fetch tier to [`FetchedPage::from_html`].
#[derive(Debug, Clone)]
pub struct RawPage {
    pub final_url: String,
    pub status: u16,
    pub html: String,
    /// Lower-cased header names.
    pub headers: BTreeMap<String, String>,
    pub load_time_secs: f64,
}

/// Result of fetching one URL. Immutable after construction.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub final_url: String,
    pub html: String,
    pub document: Document,
    pub status_code: u16,
    /// Wall-clock load time in seconds, rounded to 2 decimals.
    pub load_time: f64,
    pub size_bytes: usize,
    pub is_https: bool,
    pub domain: String,
    pub title: Option<String>,
    pub meta_tags: BTreeMap<String, String>,
    /// Response headers, lower-cased names.
    pub headers: BTreeMap<String, String>,
    pub images: usize,
    pub links: usize,
    pub forms: usize,
    pub scripts: usize,
    pub stylesheets: usize,
    /// Heading counts keyed `h1`..`h6`.
    pub headings: BTreeMap<String, usize>,
    pub tier: Option<FetchTier>,
    pub error: Option<FetchFailure>,
}

impl FetchedPage {
    /// Build a page from whatever a tier captured.
    pub fn from_html(url: &str, raw: RawPage, tier: FetchTier) -> Self {
        let document = Document::parse(&raw.html);

        let headings = (1..=6)
            .map(|level| {
                let tag = format!("h{level}");
                let n = document.count(&tag);
                (tag, n)
            })
            .collect();

        let stylesheets = document
            .elements("link")
            .filter(|l| {
                l.attr("rel")
                    .map(|r| r.split_whitespace().any(|t| t.eq_ignore_ascii_case("stylesheet")))
                    .unwrap_or(false)
            })
            .count();

        Self {
            url: url.to_string(),
            final_url: raw.final_url,
            status_code: raw.status,
            load_time: (raw.load_time_secs * 100.0).round() / 100.0,
            size_bytes: raw.html.len(),
            is_https: scheme_is_https(url),
            domain: domain_of(url),
            title: document.title(),
            meta_tags: extract_meta_tags(&document),
            headers: raw.headers,
            images: document.count("img"),
            links: document.count("a"),
            forms: document.count("form"),
            scripts: document.count("script"),
            stylesheets,
            headings,
            tier: Some(tier),
            error: None,
            html: raw.html,
            document,
        }
    }

    /// The error variant: empty collections, zero load time and size.
    pub fn failed(failure: FetchFailure) -> Self {
        let url = failure.url.clone();
        Self {
            final_url: url.clone(),
            status_code: failure.kind.status_code(),
            load_time: 0.0,
            size_bytes: 0,
            is_https: scheme_is_https(&url),
            domain: domain_of(&url),
            title: None,
            meta_tags: BTreeMap::new(),
            headers: BTreeMap::new(),
            images: 0,
            links: 0,
            forms: 0,
            scripts: 0,
            stylesheets: 0,
            headings: BTreeMap::new(),
            tier: None,
            error: Some(failure),
            html: String::new(),
            document: Document::default(),
            url,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_kind(&self) -> Option<FetchErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Outcome of running the degradation chain once.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Delivered by the browser tier.
    Success(FetchedPage),
    /// Delivered by the plain HTTP tier; the note says why.
    Degraded(FetchedPage, String),
    Failed(FetchFailure),
}

impl FetchOutcome {
    /// Collapse into the never-failing page shape.
    pub fn into_page(self) -> FetchedPage {
        match self {
            FetchOutcome::Success(page) => page,
            FetchOutcome::Degraded(page, _) => page,
            FetchOutcome::Failed(failure) => FetchedPage::failed(failure),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

/// `name`/`property` → `content` for every meta tag with both set.
fn extract_meta_tags(document: &Document) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for meta in document.elements("meta") {
        let name = meta
            .attr("name")
            .filter(|n| !n.is_empty())
            .or_else(|| meta.attr("property"))
            .unwrap_or("");
        let content = meta.attr("content").unwrap_or("");
        if !name.is_empty() && !content.is_empty() {
            tags.insert(name.to_string(), content.to_string());
        }
    }
    tags
}

fn scheme_is_https(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| u.scheme() == "https")
        .unwrap_or(false)
}

/// Host plus explicit port, like a URL netloc.
fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.host_str().map(|h| match u.port() {
                Some(p) => format!("{h}:{p}"),
                None => h.to_string(),
            })
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(html: &str) -> RawPage {
        RawPage {
            final_url: "https://example.com/home".to_string(),
            status: 200,
            html: html.to_string(),
            headers: BTreeMap::new(),
            load_time_secs: 1.23456,
        }
    }

    #[test]
    fn test_from_html_extracts_metadata() {
        let html = r#"<!DOCTYPE html><html><head>
            <title>Shop</title>
            <meta name="description" content="Things">
            <meta property="og:title" content="Shop OG">
            <meta name="empty" content="">
            <link rel="stylesheet" href="a.css"><link rel="icon" href="f.ico">
            </head><body>
            <h1>A</h1><h2>B</h2><h2>C</h2>
            <img src="x.png"><a href="/">home</a><form></form>
            <script>var a = 1;</script>
            </body></html>"#;
        let page = FetchedPage::from_html("https://example.com:8443/", raw(html), FetchTier::Http);

        assert!(!page.is_error());
        assert_eq!(page.final_url, "https://example.com/home");
        assert_eq!(page.load_time, 1.23);
        assert_eq!(page.size_bytes, html.len());
        assert!(page.is_https);
        assert_eq!(page.domain, "example.com:8443");
        assert_eq!(page.title.as_deref(), Some("Shop"));
        assert_eq!(page.meta_tags.len(), 2);
        assert_eq!(page.meta_tags["og:title"], "Shop OG");
        assert_eq!(page.stylesheets, 1);
        assert_eq!(page.images, 1);
        assert_eq!(page.links, 1);
        assert_eq!(page.forms, 1);
        assert_eq!(page.scripts, 1);
        assert_eq!(page.headings["h1"], 1);
        assert_eq!(page.headings["h2"], 2);
        assert_eq!(page.headings["h6"], 0);
        assert_eq!(page.tier, Some(FetchTier::Http));
    }

    #[test]
    fn test_failed_variant_is_empty() {
        let failure = FetchFailure::new(
            "http://nowhere.invalid/",
            FetchErrorKind::DnsError,
            "dns error",
        );
        let page = FetchOutcome::Failed(failure).into_page();
        assert!(page.is_error());
        assert_eq!(page.error_kind(), Some(FetchErrorKind::DnsError));
        assert_eq!(page.status_code, 404);
        assert_eq!(page.load_time, 0.0);
        assert_eq!(page.size_bytes, 0);
        assert_eq!(page.images + page.links + page.forms, 0);
        assert!(page.meta_tags.is_empty());
        assert_eq!(page.domain, "nowhere.invalid");
        assert!(!page.is_https);
    }
}
