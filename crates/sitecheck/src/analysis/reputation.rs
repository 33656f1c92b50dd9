// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! URL reputation lookup (VirusTotal v3).

use super::{IssueRecord, Severity};
use crate::config::ReputationSettings;
use crate::error::ServiceError;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use tracing::{debug, warn};

const CATEGORY: &str = "security";

/// A third-party URL reputation service.
#[async_trait]
pub trait ReputationService: Send + Sync {
    /// Display name, used as the record source and the primary-check label.
    fn name(&self) -> &'static str;

    /// Look up `url`. The returned record is `critical` when the URL is
    /// flagged, `info` otherwise.
    async fn check(&self, url: &str) -> Result<IssueRecord, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct UrlReport {
    data: UrlReportData,
}

#[derive(Debug, Deserialize)]
struct UrlReportData {
    attributes: UrlAttributes,
}

#[derive(Debug, Deserialize)]
struct UrlAttributes {
    last_analysis_stats: AnalysisStats,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisStats {
    #[serde(default)]
    malicious: u64,
    #[serde(default)]
    suspicious: u64,
    #[serde(default)]
    harmless: u64,
    #[serde(default)]
    undetected: u64,
}

/// VirusTotal v3 client.
pub struct VirusTotalClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VirusTotalClient {
    pub fn new(api_key: impl Into<String>, settings: &ReputationSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: settings.endpoint.trim_end_matches('/').to_string(),
        }
    }

    async fn submit(&self, url: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .post(format!("{}/urls", self.base_url))
            .header("x-apikey", &self.api_key)
            .form(&[("url", url)])
            .send()
            .await?;
        if !resp.status().is_success() {
            warn!(status = resp.status().as_u16(), "VirusTotal URL submission rejected");
        }
        Ok(())
    }
}

/// VirusTotal URL identifier: unpadded URL-safe base64 of the URL.
pub fn url_id(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

#[async_trait]
impl ReputationService for VirusTotalClient {
    fn name(&self) -> &'static str {
        "VirusTotal"
    }

    async fn check(&self, url: &str) -> Result<IssueRecord, ServiceError> {
        let resp = self
            .client
            .get(format!("{}/urls/{}", self.base_url, url_id(url)))
            .header("x-apikey", &self.api_key)
            .send()
            .await?;

        match resp.status().as_u16() {
            404 => {
                debug!(url, "URL unknown to VirusTotal, submitting");
                self.submit(url).await?;
                return Ok(IssueRecord::new(
                    Severity::Info,
                    CATEGORY,
                    "URL submitted to VirusTotal for analysis",
                )
                .with_source(self.name()));
            }
            429 => return Err(ServiceError::RateLimited),
            s if !(200..300).contains(&s) => {
                return Err(ServiceError::Status {
                    status: s,
                    message: resp.text().await.unwrap_or_default(),
                })
            }
            _ => {}
        }

        let report: UrlReport = serde_json::from_str(&resp.text().await?)?;
        let stats = report.data.attributes.last_analysis_stats;

        if stats.malicious > 0 || stats.suspicious > 0 {
            return Ok(IssueRecord::new(
                Severity::Critical,
                CATEGORY,
                "URL flagged as malicious or suspicious",
            )
            .with_source(self.name())
            .with_count((stats.malicious + stats.suspicious) as usize)
            .with_samples([
                format!("malicious: {}", stats.malicious),
                format!("suspicious: {}", stats.suspicious),
                format!(
                    "harmless: {}, undetected: {}",
                    stats.harmless, stats.undetected
                ),
            ]));
        }

        Ok(
            IssueRecord::new(Severity::Info, CATEGORY, "URL not flagged by VirusTotal")
                .with_source(self.name()),
        )
    }
}
