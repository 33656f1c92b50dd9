// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Report generation: evidence bundle in, scored report out.
//!
//! Two strategies implement [`ReportGenerator`]: [`ClaudeReporter`] asks
//! the Anthropic Messages API to write the report, and [`LocalScorer`]
//! computes it deterministically. The Claude reporter falls back to the
//! local scorer on any failure, so both always produce a report.

pub mod claude;
pub mod local;
pub mod prompt;

pub use claude::ClaudeReporter;
pub use local::LocalScorer;

use crate::config::Settings;
use crate::evidence::EvidenceBundle;
use crate::scoring::{Grade, Status};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Category names, in report order.
pub const METRIC_NAMES: [&str; 5] = [
    "Performance",
    "Security",
    "Accessibility",
    "Code Quality",
    "SEO",
];

/// Score of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetric {
    pub name: String,
    pub score: u32,
    pub status: Status,
    #[serde(default)]
    pub icon: String,
    pub description: String,
    pub color: String,
}

/// Recommendation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDetails {
    pub load_time: String,
    pub total_issues: usize,
    pub critical_issues: usize,
    pub warnings: usize,
    #[serde(default)]
    pub ai_powered: bool,
}

/// The scored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    pub overall_score: u32,
    pub grade: Grade,
    pub status: Status,
    pub summary: String,
    /// Always the five categories of [`METRIC_NAMES`], in that order.
    pub metrics: Vec<CategoryMetric>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    pub details: ReportDetails,
}

impl ReportBundle {
    /// Whether the metrics are exactly the five categories in order.
    pub fn has_canonical_metrics(&self) -> bool {
        self.metrics.len() == METRIC_NAMES.len()
            && self
                .metrics
                .iter()
                .zip(METRIC_NAMES)
                .all(|(m, name)| m.name == name)
    }

    pub fn metric(&self, name: &str) -> Option<&CategoryMetric> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

/// Strategy that turns evidence into a report. Never fails.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Label for logs.
    fn name(&self) -> &'static str;

    async fn generate(&self, evidence: &EvidenceBundle) -> ReportBundle;
}

/// Claude when an Anthropic key is configured, the local scorer otherwise.
pub fn from_settings(settings: &Settings) -> Arc<dyn ReportGenerator> {
    match &settings.credentials.anthropic_api_key {
        Some(key) => Arc::new(ClaudeReporter::new(key.clone(), &settings.report)),
        None => Arc::new(LocalScorer),
    }
}
