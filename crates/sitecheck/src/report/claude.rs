// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Report written by Claude through the Anthropic Messages API.

use super::{prompt, LocalScorer, ReportBundle, ReportGenerator};
use crate::config::ReportSettings;
use crate::error::ServiceError;
use crate::evidence::EvidenceBundle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Claude-backed report generator with a deterministic fallback.
pub struct ClaudeReporter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    settings: ReportSettings,
    fallback: LocalScorer,
}

impl ClaudeReporter {
    pub fn new(api_key: impl Into<String>, settings: &ReportSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: settings.endpoint.trim_end_matches('/').to_string(),
            settings: settings.clone(),
            fallback: LocalScorer,
        }
    }

    async fn request(&self, evidence: &EvidenceBundle) -> Result<ReportBundle, ServiceError> {
        let body = MessageRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt::build(evidence),
            }],
        };

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(ServiceError::RateLimited);
        }
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let message: MessageResponse = serde_json::from_str(&resp.text().await?)?;
        let text = message
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| ServiceError::Malformed("no text content".to_string()))?;

        parse_report(&text)
    }
}

/// Strip code fences, parse, and check the report shape.
pub fn parse_report(text: &str) -> Result<ReportBundle, ServiceError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let value: serde_json::Value = serde_json::from_str(cleaned)?;
    if value.get("metrics").is_none() || value.get("overall_score").is_none() {
        return Err(ServiceError::Malformed(
            "missing 'metrics' or 'overall_score'".to_string(),
        ));
    }

    let mut report: ReportBundle = serde_json::from_value(value)?;
    if !report.has_canonical_metrics() {
        return Err(ServiceError::Malformed(
            "metrics are not the five categories in order".to_string(),
        ));
    }
    if report.overall_score > 100 || report.metrics.iter().any(|m| m.score > 100) {
        return Err(ServiceError::Malformed(
            "scores must be within 0-100".to_string(),
        ));
    }
    report.details.ai_powered = true;
    Ok(report)
}

#[async_trait]
impl ReportGenerator for ClaudeReporter {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn generate(&self, evidence: &EvidenceBundle) -> ReportBundle {
        match self.request(evidence).await {
            Ok(report) => {
                info!(score = report.overall_score, "Claude report generated");
                report
            }
            Err(e) => {
                warn!("Claude report unavailable, using local scoring: {e}");
                self.fallback.score(evidence)
            }
        }
    }
}
