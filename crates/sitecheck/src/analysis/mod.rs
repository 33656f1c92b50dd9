// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Category analyzers and the issue record they all emit.

pub mod accessibility;
pub mod html_bugs;
pub mod reputation;
pub mod security;

use serde::{Deserialize, Serialize};

/// Maximum number of sample fragments kept on one record.
pub const MAX_SAMPLES: usize = 3;

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn is_info(self) -> bool {
        matches!(self, Severity::Info)
    }
}

/// The normalized unit emitted by every analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,
    /// WCAG success criterion, for accessibility findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guideline: Option<String>,
    /// Which service produced the finding, when not a local check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl IssueRecord {
    pub fn new(severity: Severity, category: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.to_string(),
            message: message.into(),
            count: None,
            samples: Vec::new(),
            guideline: None,
            source: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attach samples, keeping at most [`MAX_SAMPLES`].
    pub fn with_samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.samples = samples
            .into_iter()
            .take(MAX_SAMPLES)
            .map(Into::into)
            .collect();
        self
    }

    pub fn with_guideline(mut self, guideline: &str) -> Self {
        self.guideline = Some(guideline.to_string());
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

/// Replace an empty finding list with the single info record.
pub fn ensure_non_empty(issues: Vec<IssueRecord>, category: &str, message: &str) -> Vec<IssueRecord> {
    if issues.is_empty() {
        vec![IssueRecord::new(Severity::Info, category, message)]
    } else {
        issues
    }
}

/// Number of records that are actual findings (anything but `info`).
pub fn actionable_count(issues: &[IssueRecord]) -> usize {
    issues.iter().filter(|i| !i.severity.is_info()).count()
}

/// First `n` characters of `s`.
pub(crate) fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
