// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Prompt for the report-writing model.

use crate::evidence::EvidenceBundle;
use serde::Serialize;

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Build the prompt embedding the evidence as JSON.
pub fn build(evidence: &EvidenceBundle) -> String {
    let load_time = evidence
        .load_time
        .map(|t| format!("{t:.2}s"))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        r##"You are a senior web QA specialist with deep expertise in performance, security, accessibility, and code quality.

Analyze the following QA results and generate a detailed scored report.

**Website URL:** {url}

**Performance Data:**
{performance}

**Accessibility Issues:**
{accessibility}

**Security Issues:**
{security}

**HTML Bugs:**
{html}

**SEO Data:**
{seo}

**Additional Metrics:**
- Load Time: {load_time}
- Page Size: {size} bytes
- Status Code: {status}

**Your Task:**
Generate a JSON report for a dashboard with an overall score (0-100) and letter grade (A-F), a score for each category, priority-based recommendations with expected impact, and a short executive summary for non-technical stakeholders.

**Required JSON Structure:**

{{
  "overall_score": <number 0-100>,
  "grade": "<A|B|C|D|F>",
  "status": "<excellent|good|warning|critical>",
  "summary": "<2-3 sentence executive summary>",
  "metrics": [
    {{"name": "Performance", "score": <0-100>, "status": "<status>", "icon": "⚡", "description": "<assessment>", "color": "<hex>"}},
    {{"name": "Security", "score": <0-100>, "status": "<status>", "icon": "🔒", "description": "<assessment>", "color": "<hex>"}},
    {{"name": "Accessibility", "score": <0-100>, "status": "<status>", "icon": "♿", "description": "<assessment>", "color": "<hex>"}},
    {{"name": "Code Quality", "score": <0-100>, "status": "<status>", "icon": "💻", "description": "<assessment>", "color": "<hex>"}},
    {{"name": "SEO", "score": <0-100>, "status": "<status>", "icon": "🔍", "description": "<assessment>", "color": "<hex>"}}
  ],
  "highlights": [
    "<most critical finding requiring immediate attention>",
    "<second most important finding>",
    "<positive finding or achievement>"
  ],
  "recommendations": [
    {{
      "priority": "<critical|high|medium|low>",
      "category": "<Performance|Security|Accessibility|Code Quality|SEO>",
      "title": "<action item>",
      "description": "<detailed explanation>",
      "impact": "<expected improvement>"
    }}
  ],
  "details": {{
    "load_time": "<formatted load time>",
    "total_issues": <count>,
    "critical_issues": <count>,
    "warnings": <count>
  }}
}}

**Scoring Guidelines:**
- 90-100 (A): Excellent, color #10b981
- 75-89 (B): Good, color #3b82f6
- 50-74 (C): Warning, color #f59e0b
- 0-49 (D/F): Critical, color #ef4444

**Important:**
- Keep the five metrics in exactly the order shown
- Calculate scores from the data provided and cite specific numbers
- Return ONLY valid JSON, no markdown formatting, no explanations

Generate the report now:"##,
        url = evidence.final_url,
        performance = pretty(&evidence.performance),
        accessibility = pretty(&evidence.accessibility_issues),
        security = pretty(&evidence.security_issues),
        html = pretty(&evidence.html_bugs),
        seo = pretty(&evidence.seo_data),
        size = evidence.size_bytes,
        status = evidence.status,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_evidence() {
        let ev = EvidenceBundle {
            final_url: "https://example.com/".into(),
            status: 200,
            size_bytes: 4096,
            load_time: Some(0.5),
            ..EvidenceBundle::default()
        };
        let prompt = build(&ev);
        assert!(prompt.contains("**Website URL:** https://example.com/"));
        assert!(prompt.contains("- Page Size: 4096 bytes"));
        assert!(prompt.contains("- Load Time: 0.50s"));
        assert!(prompt.contains(r#""name": "Code Quality""#));
        assert!(prompt.contains("**Performance Data:**\nnull"));
    }
}
