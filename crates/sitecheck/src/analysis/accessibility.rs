// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! WCAG 2.1 structural checks. Pure: depends only on the parsed document.

use super::{ensure_non_empty, truncate_chars, IssueRecord, Severity};
use crate::page::Document;

const CATEGORY: &str = "accessibility";

const NON_DESCRIPTIVE_LINKS: &[&str] = &["click here", "read more", "link", "more", "here"];

const LIGHT_COLORS: &[&str] = &[
    "white",
    "#fff",
    "#ffffff",
    "rgb(255,255,255)",
    "lightgray",
    "yellow",
];

/// Run every check. Each contributes at most one record.
pub fn analyze(doc: &Document) -> Vec<IssueRecord> {
    let mut issues = Vec::new();

    let missing_alt = images_without_alt(doc);
    if !missing_alt.is_empty() {
        issues.push(
            IssueRecord::new(
                Severity::Error,
                CATEGORY,
                format!("Found {} image(s) without alt text", missing_alt.len()),
            )
            .with_guideline("WCAG 1.1.1")
            .with_count(missing_alt.len())
            .with_samples(missing_alt),
        );
    }

    let unlabeled = inputs_without_label(doc);
    if !unlabeled.is_empty() {
        issues.push(
            IssueRecord::new(
                Severity::Error,
                CATEGORY,
                format!("Found {} form input(s) without labels", unlabeled.len()),
            )
            .with_guideline("WCAG 1.3.1")
            .with_count(unlabeled.len())
            .with_samples(unlabeled),
        );
    }

    let heading_issues = heading_hierarchy(doc);
    if !heading_issues.is_empty() {
        issues.push(
            IssueRecord::new(Severity::Warning, CATEGORY, "Heading hierarchy issues detected")
                .with_guideline("WCAG 2.4.6")
                .with_count(heading_issues.len())
                .with_samples(heading_issues),
        );
    }

    let bad_links = non_descriptive_links(doc);
    if !bad_links.is_empty() {
        issues.push(
            IssueRecord::new(
                Severity::Warning,
                CATEGORY,
                format!("Found {} link(s) with non-descriptive text", bad_links.len()),
            )
            .with_guideline("WCAG 2.4.4")
            .with_count(bad_links.len())
            .with_samples(bad_links),
        );
    }

    let contrast = light_inline_colors(doc);
    if !contrast.is_empty() {
        issues.push(
            IssueRecord::new(Severity::Warning, CATEGORY, "Potential color contrast issues found")
                .with_guideline("WCAG 1.4.3")
                .with_count(contrast.len())
                .with_samples(contrast),
        );
    }

    let has_lang = doc.root().map(|r| r.has_attr("lang")).unwrap_or(false);
    if !has_lang {
        issues.push(
            IssueRecord::new(
                Severity::Error,
                CATEGORY,
                "Missing 'lang' attribute on <html> element",
            )
            .with_guideline("WCAG 3.1.1"),
        );
    }

    ensure_non_empty(issues, CATEGORY, "No accessibility issues detected")
}

fn images_without_alt(doc: &Document) -> Vec<String> {
    doc.elements("img")
        .filter(|img| img.attr("alt").map(|a| a.trim().is_empty()).unwrap_or(true))
        .map(|img| {
            let src = img.attr("src").unwrap_or("unknown");
            format!("<img src='{}...'>", truncate_chars(src, 50))
        })
        .collect()
}

fn inputs_without_label(doc: &Document) -> Vec<String> {
    doc.elements("input")
        .filter_map(|input| {
            let input_type = input.attr("type").unwrap_or("text");
            if matches!(input_type, "hidden" | "submit" | "button") {
                return None;
            }
            if let Some(id) = input.attr("id").filter(|id| !id.is_empty()) {
                if doc.find("label", "for", id).is_some() {
                    return None;
                }
            }
            if input.has_ancestor("label") {
                return None;
            }
            let name = input.attr("name").unwrap_or("unknown");
            Some(format!("<input type='{input_type}' name='{name}'>"))
        })
        .collect()
}

fn heading_hierarchy(doc: &Document) -> Vec<String> {
    let levels = doc.heading_levels();
    let mut issues = Vec::new();

    let h1_count = levels.iter().filter(|&&l| l == 1).count();
    if h1_count > 1 {
        issues.push(format!("Multiple h1 elements found ({h1_count})"));
    }

    for pair in levels.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next > prev + 1 {
            issues.push(format!("Skipped from <h{prev}> to <h{next}>"));
        }
    }

    issues
}

fn non_descriptive_links(doc: &Document) -> Vec<String> {
    doc.elements("a")
        .filter_map(|a| {
            let text = a.text().to_lowercase();
            let href = truncate_chars(a.attr("href").unwrap_or("#"), 30);
            if text.is_empty() {
                Some(format!("<a href='{href}...'> (empty text)"))
            } else if NON_DESCRIPTIVE_LINKS.contains(&text.as_str()) {
                Some(format!("<a href='{href}...'>{text}</a>"))
            } else {
                None
            }
        })
        .collect()
}

fn light_inline_colors(doc: &Document) -> Vec<String> {
    doc.with_attr("style")
        .filter_map(|el| {
            let style = el.attr("style").unwrap_or("").to_lowercase();
            let flagged =
                style.contains("color:") && LIGHT_COLORS.iter().any(|c| style.contains(c));
            flagged.then(|| {
                format!(
                    "Potential contrast issue: {} with style='{}'",
                    el.tag(),
                    truncate_chars(&style, 50)
                )
            })
        })
        .collect()
}
