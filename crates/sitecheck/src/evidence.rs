// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! The evidence bundle handed to the report generator.

use crate::analysis::security::SecurityResult;
use crate::analysis::{actionable_count, IssueRecord};
use crate::page::{FetchFailure, FetchedPage};
use crate::performance::PerformanceResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SEO signals extracted from the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoData {
    pub title: Option<String>,
    pub meta_tags: BTreeMap<String, String>,
    pub has_title: bool,
    pub has_meta: bool,
    pub links: usize,
    pub images: usize,
    /// Heading counts keyed `h1`..`h6`.
    pub headings: BTreeMap<String, usize>,
}

impl SeoData {
    pub fn from_page(page: &FetchedPage) -> Self {
        Self {
            title: page.title.clone(),
            meta_tags: page.meta_tags.clone(),
            has_title: page.title.is_some(),
            has_meta: !page.meta_tags.is_empty(),
            links: page.links,
            images: page.images,
            headings: page.headings.clone(),
        }
    }
}

/// Everything the analyzers found about one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    /// Seconds. Absent when the fetch failed.
    pub load_time: Option<f64>,
    pub size_bytes: usize,
    pub title: Option<String>,
    pub domain: String,
    pub meta_tags: BTreeMap<String, String>,
    pub links: usize,
    pub images: usize,
    pub forms: usize,
    pub performance: Option<PerformanceResult>,
    pub accessibility_issues: Vec<IssueRecord>,
    pub security_issues: Option<SecurityResult>,
    pub html_bugs: Vec<IssueRecord>,
    pub seo_data: Option<SeoData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<FetchFailure>,
}

impl EvidenceBundle {
    /// Assemble the bundle for a successfully fetched page.
    pub fn from_page(
        page: &FetchedPage,
        performance: PerformanceResult,
        accessibility_issues: Vec<IssueRecord>,
        security: SecurityResult,
        html_bugs: Vec<IssueRecord>,
    ) -> Self {
        Self {
            url: page.url.clone(),
            final_url: page.final_url.clone(),
            status: page.status_code,
            load_time: Some(page.load_time),
            size_bytes: page.size_bytes,
            title: page.title.clone(),
            domain: page.domain.clone(),
            meta_tags: page.meta_tags.clone(),
            links: page.links,
            images: page.images,
            forms: page.forms,
            performance: Some(performance),
            accessibility_issues,
            security_issues: Some(security),
            html_bugs,
            seo_data: Some(SeoData::from_page(page)),
            fetch_error: None,
        }
    }

    /// Minimal bundle carrying only the fetch failure.
    pub fn fetch_failed(failure: &FetchFailure) -> Self {
        Self {
            url: failure.url.clone(),
            final_url: failure.url.clone(),
            status: failure.kind.status_code(),
            fetch_error: Some(failure.clone()),
            ..Self::default()
        }
    }

    /// Actionable security findings.
    pub fn security_count(&self) -> usize {
        self.security_issues
            .as_ref()
            .map(|s| actionable_count(&s.issues))
            .unwrap_or(0)
    }

    /// Actionable accessibility findings.
    pub fn accessibility_count(&self) -> usize {
        actionable_count(&self.accessibility_issues)
    }

    /// Actionable HTML findings.
    pub fn html_bug_count(&self) -> usize {
        actionable_count(&self.html_bugs)
    }

    /// Prober score, when the prober produced one.
    pub fn performance_score(&self) -> Option<u32> {
        self.performance
            .as_ref()
            .filter(|p| p.available)
            .and_then(|p| p.score)
    }

    pub fn has_title(&self) -> bool {
        self.seo_data.as_ref().map(|s| s.has_title).unwrap_or(false)
    }

    pub fn has_meta(&self) -> bool {
        self.seo_data.as_ref().map(|s| s.has_meta).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Severity;
    use crate::error::FetchErrorKind;

    #[test]
    fn test_fetch_failed_bundle() {
        let failure = FetchFailure::new("https://gone.example", FetchErrorKind::Timeout, "timed out");
        let ev = EvidenceBundle::fetch_failed(&failure);
        assert_eq!(ev.status, 408);
        assert!(ev.load_time.is_none());
        assert!(ev.performance.is_none());
        assert_eq!(ev.security_count(), 0);
        assert!(!ev.has_title());

        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["fetch_error"]["kind"], "timeout");
    }

    #[test]
    fn test_counts_skip_info_records() {
        let ev = EvidenceBundle {
            accessibility_issues: vec![IssueRecord::new(Severity::Info, "accessibility", "ok")],
            html_bugs: vec![
                IssueRecord::new(Severity::Error, "html", "a"),
                IssueRecord::new(Severity::Warning, "html", "b"),
            ],
            ..EvidenceBundle::default()
        };
        assert_eq!(ev.accessibility_count(), 0);
        assert_eq!(ev.html_bug_count(), 2);
    }
}
