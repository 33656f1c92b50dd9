// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Orchestrator: fetch → analyze → report.
//!
//! `SiteChecker` owns one of every pipeline component. It is cheap to clone
//! and safe to share across requests; the performance store inside the
//! prober is the only shared mutable state.

use crate::analysis::accessibility;
use crate::analysis::html_bugs::HtmlBugsAnalyzer;
use crate::analysis::security::SecurityAnalyzer;
use crate::config::Settings;
use crate::error::FetchErrorKind;
use crate::evidence::EvidenceBundle;
use crate::fetch::PageFetcher;
use crate::page::{FetchFailure, FetchOutcome, FetchedPage};
use crate::performance::{PerformanceProber, Strategy};
use crate::renderer::BrowserHandle;
use crate::report::{self, ReportBundle, ReportGenerator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A report plus the metadata of a fetch that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReportBundle {
    #[serde(flatten)]
    pub report: ReportBundle,
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub error: bool,
    pub error_type: FetchErrorKind,
    pub error_message: String,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: f64,
}

/// Result of one analysis. Serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(ReportBundle),
    FetchFailed(ErrorReportBundle),
}

impl AnalysisOutcome {
    /// The report, whichever branch produced it.
    pub fn report(&self) -> &ReportBundle {
        match self {
            AnalysisOutcome::Report(r) => r,
            AnalysisOutcome::FetchFailed(e) => &e.report,
        }
    }

    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, AnalysisOutcome::FetchFailed(_))
    }
}

/// The analysis pipeline.
#[derive(Clone)]
pub struct SiteChecker {
    fetcher: PageFetcher,
    html: HtmlBugsAnalyzer,
    security: SecurityAnalyzer,
    performance: PerformanceProber,
    reporter: Arc<dyn ReportGenerator>,
}

impl SiteChecker {
    pub fn new(
        fetcher: PageFetcher,
        html: HtmlBugsAnalyzer,
        security: SecurityAnalyzer,
        performance: PerformanceProber,
        reporter: Arc<dyn ReportGenerator>,
    ) -> Self {
        Self {
            fetcher,
            html,
            security,
            performance,
            reporter,
        }
    }

    /// Wire every component from the settings and the browser handle.
    pub fn from_settings(settings: &Settings, browser: &BrowserHandle) -> Self {
        Self::new(
            PageFetcher::new(browser.get(), settings.fetch.clone()),
            HtmlBugsAnalyzer::new(settings.validator.clone()),
            SecurityAnalyzer::from_settings(settings),
            PerformanceProber::from_settings(settings),
            report::from_settings(settings),
        )
    }

    /// Analyze with the configured default strategy.
    pub async fn analyze_url(&self, url: &str) -> AnalysisOutcome {
        let strategy = self.performance.default_strategy();
        self.analyze_url_with(url, strategy).await
    }

    /// Analyze one URL. Never fails.
    pub async fn analyze_url_with(&self, url: &str, strategy: Strategy) -> AnalysisOutcome {
        let start = Instant::now();
        info!(url, %strategy, reporter = self.reporter.name(), "analysis started");

        let outcome = match self.fetcher.fetch_outcome(url).await {
            FetchOutcome::Success(page) => {
                AnalysisOutcome::Report(self.analyze_page(&page, strategy).await)
            }
            FetchOutcome::Degraded(page, note) => {
                info!(url, "page delivered without browser ({note})");
                AnalysisOutcome::Report(self.analyze_page(&page, strategy).await)
            }
            FetchOutcome::Failed(failure) => {
                AnalysisOutcome::FetchFailed(self.report_failure(url, failure, start).await)
            }
        };

        info!(
            url,
            score = outcome.report().overall_score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis finished"
        );
        outcome
    }

    async fn analyze_page(&self, page: &FetchedPage, strategy: Strategy) -> ReportBundle {
        let (html_bugs, security, performance) = tokio::join!(
            self.html.analyze(&page.html),
            self.security
                .analyze(&page.document, &page.final_url, &page.headers),
            self.performance.analyze(&page.final_url, strategy),
        );
        let accessibility_issues = accessibility::analyze(&page.document);

        let evidence = EvidenceBundle::from_page(
            page,
            performance,
            accessibility_issues,
            security,
            html_bugs,
        );
        self.reporter.generate(&evidence).await
    }

    async fn report_failure(
        &self,
        url: &str,
        failure: FetchFailure,
        start: Instant,
    ) -> ErrorReportBundle {
        warn!(url, kind = %failure.kind, "reporting fetch failure");
        let evidence = EvidenceBundle::fetch_failed(&failure);
        let report = self.reporter.generate(&evidence).await;
        let page = FetchedPage::failed(failure);
        let (error_type, error_message) = match &page.error {
            Some(f) => (f.kind, f.message.clone()),
            None => (FetchErrorKind::FetchFailed, String::new()),
        };

        ErrorReportBundle {
            report,
            url: url.to_string(),
            final_url: page.final_url,
            status: page.status_code,
            error: true,
            error_type,
            error_message,
            domain: page.domain,
            timestamp: Utc::now(),
            duration_seconds: (start.elapsed().as_secs_f64() * 100.0).round() / 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::LocalScorer;

    #[test]
    fn test_error_bundle_serializes_flat() {
        let report = LocalScorer.score(&EvidenceBundle::default());
        let bundle = ErrorReportBundle {
            report,
            url: "https://nowhere.invalid/".into(),
            final_url: "https://nowhere.invalid/".into(),
            status: 404,
            error: true,
            error_type: FetchErrorKind::DnsError,
            error_message: "dns error".into(),
            domain: "nowhere.invalid".into(),
            timestamp: Utc::now(),
            duration_seconds: 0.12,
        };
        let json = serde_json::to_value(AnalysisOutcome::FetchFailed(bundle)).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(json["error_type"], "dns_error");
        assert_eq!(json["overall_score"], 90);
        assert_eq!(json["metrics"].as_array().unwrap().len(), 5);
        assert!(json.get("report").is_none());
    }
}
