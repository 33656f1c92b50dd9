// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTML correctness: Nu markup validator with a local structural fallback.

use super::{ensure_non_empty, truncate_chars, IssueRecord, Severity};
use crate::config::ValidatorSettings;
use crate::error::ServiceError;
use crate::page::Document;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

const CATEGORY: &str = "html";

const NO_BUGS: &str = "No HTML bugs found";

const DEPRECATED_TAGS: &[&str] = &["center", "font", "marquee", "blink", "big", "strike"];

#[derive(Debug, Deserialize)]
struct ValidatorResponse {
    messages: Option<Vec<ValidatorMessage>>,
}

#[derive(Debug, Deserialize)]
struct ValidatorMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
    extract: Option<String>,
}

/// HTML-correctness analyzer.
#[derive(Clone)]
pub struct HtmlBugsAnalyzer {
    client: reqwest::Client,
    settings: ValidatorSettings,
}

impl HtmlBugsAnalyzer {
    pub fn new(settings: ValidatorSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_default();
        Self { client, settings }
    }

    /// Never fails; with nothing to report returns a single info record.
    pub async fn analyze(&self, html: &str) -> Vec<IssueRecord> {
        match self.validate_remote(html).await {
            Ok(issues) => ensure_non_empty(issues, CATEGORY, NO_BUGS),
            Err(ServiceError::Disabled) => {
                debug!("markup validator disabled, using local checks");
                local_checks(html)
            }
            Err(e) => {
                warn!("markup validator unavailable, using local checks: {e}");
                local_checks(html)
            }
        }
    }

    async fn validate_remote(&self, html: &str) -> Result<Vec<IssueRecord>, ServiceError> {
        let endpoint = self.settings.endpoint.as_deref().ok_or(ServiceError::Disabled)?;

        let resp = self
            .client
            .post(endpoint)
            .query(&[("out", "json")])
            .header(reqwest::header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(html.to_string())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body: ValidatorResponse = serde_json::from_str(&resp.text().await?)?;
        let messages = body
            .messages
            .ok_or_else(|| ServiceError::Malformed("missing 'messages'".to_string()))?;

        Ok(messages.into_iter().filter_map(map_message).collect())
    }
}

fn map_message(msg: ValidatorMessage) -> Option<IssueRecord> {
    // Only `error` and `warning` are kept; `info` (any subType) and
    // non-document errors are dropped.
    let severity = match msg.kind.as_str() {
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        _ => return None,
    };
    let record = IssueRecord::new(severity, CATEGORY, msg.message).with_source("validator");
    Some(match msg.extract {
        Some(extract) => record.with_samples([truncate_chars(extract.trim(), 120)]),
        None => record,
    })
}

fn structure_tag(tag: &str) -> &'static Regex {
    static HTML: OnceLock<Regex> = OnceLock::new();
    static HEAD: OnceLock<Regex> = OnceLock::new();
    static BODY: OnceLock<Regex> = OnceLock::new();
    let (cell, pattern) = match tag {
        "html" => (&HTML, r"(?i)<html[\s>/]"),
        "head" => (&HEAD, r"(?i)<head[\s>/]"),
        _ => (&BODY, r"(?i)<body[\s>/]"),
    };
    cell.get_or_init(|| Regex::new(pattern).expect("structure tag regex is valid"))
}

/// Local structural checks, in fixed order. Deterministic.
///
/// `<html>`, `<head>` and `<body>` are looked for in the source text since
/// the parser synthesizes them when absent.
pub fn local_checks(html: &str) -> Vec<IssueRecord> {
    let doc = Document::parse(html);
    let mut issues = Vec::new();

    if !doc.has_doctype() {
        issues.push(IssueRecord::new(
            Severity::Warning,
            CATEGORY,
            "Missing DOCTYPE declaration",
        ));
    }

    for tag in ["html", "head", "body"] {
        if !structure_tag(tag).is_match(html) {
            issues.push(IssueRecord::new(
                Severity::Error,
                CATEGORY,
                format!("Missing <{tag}> element"),
            ));
        }
    }

    if doc.first("title").is_none() {
        issues.push(IssueRecord::new(
            Severity::Error,
            CATEGORY,
            "Missing <title> element",
        ));
    }

    let has_charset = doc.elements("meta").any(|m| {
        m.has_attr("charset")
            || (m
                .attr("http-equiv")
                .map(|h| h.eq_ignore_ascii_case("content-type"))
                .unwrap_or(false)
                && m.attr("content")
                    .map(|c| c.to_ascii_lowercase().contains("charset"))
                    .unwrap_or(false))
    });
    if !has_charset {
        issues.push(IssueRecord::new(
            Severity::Warning,
            CATEGORY,
            "Missing character encoding declaration",
        ));
    }

    let no_alt: Vec<String> = doc
        .elements("img")
        .filter(|img| !img.has_attr("alt"))
        .map(|img| format!("<img src='{}'>", truncate_chars(img.attr("src").unwrap_or(""), 50)))
        .collect();
    if !no_alt.is_empty() {
        issues.push(
            IssueRecord::new(
                Severity::Warning,
                CATEGORY,
                format!("Found {} image(s) without alt attribute", no_alt.len()),
            )
            .with_count(no_alt.len())
            .with_samples(no_alt),
        );
    }

    // id → occurrences, plus first-seen order
    let mut id_counts: HashMap<&str, usize> = HashMap::new();
    let mut id_order: Vec<&str> = Vec::new();
    for el in doc.with_attr("id") {
        let id = el.attr("id").unwrap_or("");
        if id.is_empty() {
            continue;
        }
        let n = id_counts.entry(id).or_insert(0);
        if *n == 0 {
            id_order.push(id);
        }
        *n += 1;
    }
    for id in id_order {
        let n = id_counts[id];
        if n > 1 {
            issues.push(
                IssueRecord::new(
                    Severity::Error,
                    CATEGORY,
                    format!("Duplicate id '{id}' found {n} times"),
                )
                .with_count(n),
            );
        }
    }

    for tag in DEPRECATED_TAGS {
        let n = doc.count(tag);
        if n > 0 {
            issues.push(
                IssueRecord::new(
                    Severity::Warning,
                    CATEGORY,
                    format!("Deprecated <{tag}> tag used {n} time(s)"),
                )
                .with_count(n),
            );
        }
    }

    ensure_non_empty(issues, CATEGORY, NO_BUGS)
}
