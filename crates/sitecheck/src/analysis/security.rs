// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Security posture: URL reputation first, then static checks.

use super::reputation::{ReputationService, VirusTotalClient};
use super::{IssueRecord, Severity};
use crate::config::Settings;
use crate::page::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

const CATEGORY: &str = "security";

/// Response headers every page should send.
pub const SECURITY_HEADERS: &[&str] = &[
    "Strict-Transport-Security",
    "Content-Security-Policy",
    "X-Frame-Options",
    "X-Content-Type-Options",
    "Referrer-Policy",
];

/// Output of the security analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityResult {
    pub primary_check: String,
    pub fallback_used: bool,
    /// Reputation finding first when present, then static findings.
    pub issues: Vec<IssueRecord>,
}

/// Security analyzer.
#[derive(Clone)]
pub struct SecurityAnalyzer {
    reputation: Option<Arc<dyn ReputationService>>,
}

impl SecurityAnalyzer {
    pub fn new(reputation: Option<Arc<dyn ReputationService>>) -> Self {
        Self { reputation }
    }

    /// VirusTotal when a key is configured, static checks only otherwise.
    pub fn from_settings(settings: &Settings) -> Self {
        let reputation = settings
            .credentials
            .virustotal_api_key
            .as_ref()
            .map(|key| {
                Arc::new(VirusTotalClient::new(key.clone(), &settings.reputation))
                    as Arc<dyn ReputationService>
            });
        Self::new(reputation)
    }

    /// Never fails.
    pub async fn analyze(
        &self,
        doc: &Document,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> SecurityResult {
        let mut result = SecurityResult {
            primary_check: self
                .reputation
                .as_ref()
                .map(|r| r.name())
                .unwrap_or("VirusTotal")
                .to_string(),
            fallback_used: false,
            issues: Vec::new(),
        };

        match &self.reputation {
            Some(reputation) => match reputation.check(url).await {
                Ok(record) => {
                    let critical = record.severity == Severity::Critical;
                    result.issues.push(record);
                    if critical {
                        return result;
                    }
                }
                Err(e) => {
                    warn!(url, "reputation check failed, using static checks: {e}");
                    result.fallback_used = true;
                }
            },
            None => result.fallback_used = true,
        }

        result.issues.extend(static_checks(doc, url, headers));

        if result.issues.is_empty() {
            result.issues.push(IssueRecord::new(
                Severity::Info,
                CATEGORY,
                "No security issues detected",
            ));
        }
        result
    }
}

/// HTTPS, security headers, inline scripts. In that order.
pub fn static_checks(
    doc: &Document,
    url: &str,
    headers: &BTreeMap<String, String>,
) -> Vec<IssueRecord> {
    let mut issues = Vec::new();

    let is_https = url::Url::parse(url)
        .map(|u| u.scheme() == "https")
        .unwrap_or(false);
    if !is_https {
        issues.push(IssueRecord::new(
            Severity::Critical,
            CATEGORY,
            "Site is not using HTTPS",
        ));
    }

    let missing: Vec<&str> = SECURITY_HEADERS
        .iter()
        .copied()
        .filter(|h| !headers.contains_key(&h.to_ascii_lowercase()))
        .collect();
    if !missing.is_empty() {
        issues.push(
            IssueRecord::new(
                Severity::High,
                CATEGORY,
                format!("Missing security headers: {}", missing.join(", ")),
            )
            .with_count(missing.len()),
        );
    }

    let inline = doc
        .elements("script")
        .filter(|s| s.attr("src").map(str::is_empty).unwrap_or(true) && !s.text().is_empty())
        .count();
    if inline > 0 {
        issues.push(
            IssueRecord::new(
                Severity::Medium,
                CATEGORY,
                format!("{inline} inline scripts detected"),
            )
            .with_count(inline),
        );
    }

    issues
}
