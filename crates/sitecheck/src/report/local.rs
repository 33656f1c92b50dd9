// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deterministic report scoring.

use super::{
    CategoryMetric, Priority, Recommendation, ReportBundle, ReportDetails, ReportGenerator,
    METRIC_NAMES,
};
use crate::evidence::EvidenceBundle;
use crate::scoring::{Grade, Status};
use async_trait::async_trait;

/// Performance score assumed when the prober produced none.
const DEFAULT_PERFORMANCE_SCORE: u32 = 85;

const ICONS: [&str; 5] = ["⚡", "🔒", "♿", "💻", "🔍"];

/// Scores a report from issue counts alone. Same evidence, same report.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScorer;

impl LocalScorer {
    pub fn score(&self, evidence: &EvidenceBundle) -> ReportBundle {
        let n_security = evidence.security_count();
        let n_a11y = evidence.accessibility_count();
        let n_html = evidence.html_bug_count();
        let has_title = evidence.has_title();
        let has_meta = evidence.has_meta();

        let load_time = evidence
            .load_time
            .map(|t| format!("{t:.2}s"))
            .unwrap_or_else(|| "N/A".to_string());

        let perf_score = evidence
            .performance_score()
            .unwrap_or(DEFAULT_PERFORMANCE_SCORE);
        let sec_score = penalized(n_security, 15);
        let a11y_score = penalized(n_a11y, 10);
        let code_score = if n_html == 0 {
            95
        } else {
            penalized(n_html, 8)
        };
        let seo_score = 70 + if has_title { 15 } else { 0 } + if has_meta { 15 } else { 0 };

        let scores = [perf_score, sec_score, a11y_score, code_score, seo_score];
        let descriptions = [
            format!("Load time: {load_time}"),
            format!("{n_security} security issues detected"),
            format!("{n_a11y} accessibility issues found"),
            if n_html > 0 {
                format!("{n_html} HTML issues detected")
            } else {
                "Clean HTML structure".to_string()
            },
            "Search engine optimization".to_string(),
        ];

        let metrics: Vec<CategoryMetric> = METRIC_NAMES
            .iter()
            .zip(ICONS)
            .zip(scores)
            .zip(descriptions)
            .map(|(((name, icon), score), description)| {
                let status = Status::from_score(score);
                CategoryMetric {
                    name: name.to_string(),
                    score,
                    status,
                    icon: icon.to_string(),
                    description,
                    color: status.color().to_string(),
                }
            })
            .collect();

        let mut recommendations = Vec::new();
        if n_security > 0 {
            recommendations.push(recommendation(
                Priority::Critical,
                "Security",
                "Fix Security Vulnerabilities",
                "Add missing security headers (CSP, X-Frame-Options), remove inline scripts, ensure secure data transmission",
                "Protect user data and prevent common web attacks",
            ));
        }
        if perf_score < 70 {
            recommendations.push(recommendation(
                Priority::High,
                "Performance",
                "Optimize Page Performance",
                "Reduce blocking scripts, compress images, and optimize assets to improve load times",
                "Expected 30-50% faster load times",
            ));
        }
        if n_a11y > 0 {
            recommendations.push(recommendation(
                Priority::Medium,
                "Accessibility",
                "Improve Web Accessibility",
                "Add alt text to images, improve color contrast, use semantic HTML, ensure keyboard navigation",
                "Make your site usable for all users including those with disabilities",
            ));
        }
        if n_html > 0 {
            recommendations.push(recommendation(
                Priority::Low,
                "Code Quality",
                "Fix HTML Structure Issues",
                "Correct invalid HTML markup, fix nesting errors, ensure valid HTML5 structure",
                "Better browser compatibility and maintainability",
            ));
        }
        if !has_title || !has_meta {
            recommendations.push(recommendation(
                Priority::Medium,
                "SEO",
                "Improve SEO Metadata",
                "Add descriptive title tags, meta descriptions, structured data for better search visibility",
                "Improved search engine rankings and click-through rates",
            ));
        }

        let overall_score = scores.iter().sum::<u32>() / scores.len() as u32;

        // Most severe first.
        let mut highlights = Vec::new();
        if n_security > 0 {
            highlights.push(format!(
                "Security: {n_security} critical issues require attention"
            ));
        }
        if perf_score < 70 {
            highlights.push(format!(
                "Performance score: {perf_score}/100 - optimization needed"
            ));
        }
        if n_a11y > 0 {
            highlights.push(format!("Accessibility: {n_a11y} WCAG violations detected"));
        }
        if overall_score >= 80 {
            highlights.insert(0, "✅ Excellent overall performance!".to_string());
        } else if overall_score >= 60 {
            highlights.insert(0, "👍 Good foundation with room for improvement".to_string());
        }
        if highlights.is_empty() {
            highlights = vec![
                "✅ All critical checks passed".to_string(),
                "Site is performing well overall".to_string(),
            ];
        }

        let verdict = if overall_score >= 80 {
            "Excellent work! Minor optimizations recommended."
        } else if overall_score >= 60 {
            "Solid foundation with room for optimization."
        } else {
            "Several critical issues need immediate attention."
        };

        ReportBundle {
            overall_score,
            grade: Grade::from_score(overall_score),
            status: Status::from_score(overall_score),
            summary: format!("Website scored {overall_score}/100. {verdict}"),
            metrics,
            highlights,
            recommendations,
            details: ReportDetails {
                load_time,
                total_issues: n_security + n_a11y + n_html,
                critical_issues: n_security,
                warnings: n_a11y + n_html,
                ai_powered: false,
            },
        }
    }
}

#[async_trait]
impl ReportGenerator for LocalScorer {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn generate(&self, evidence: &EvidenceBundle) -> ReportBundle {
        self.score(evidence)
    }
}

/// `max(0, 100 - per_issue * n)`.
fn penalized(n: usize, per_issue: u32) -> u32 {
    let penalty = u32::try_from(n).unwrap_or(u32::MAX).saturating_mul(per_issue);
    100u32.saturating_sub(penalty)
}

fn recommendation(
    priority: Priority,
    category: &str,
    title: &str,
    description: &str,
    impact: &str,
) -> Recommendation {
    Recommendation {
        priority,
        category: category.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        impact: impact.to_string(),
    }
}
