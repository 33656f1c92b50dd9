// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Performance prober: PageSpeed Insights with a local timing fallback.
//!
//! API results are cached per (URL, strategy) and calls are serialized
//! through the shared [`PerformanceStore`] with a global cooldown. Any
//! failure, including a cooldown that has not elapsed, is answered by a
//! timed GET of the page scored with a simple heuristic. Fallback results
//! are never cached.

pub mod pagespeed;
pub mod store;

pub use store::PerformanceStore;

use crate::config::{PerformanceSettings, Settings};
use crate::error::ServiceError;
use crate::scoring::Grade;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const PAGESPEED_SOURCE: &str = "Google PageSpeed Insights";
pub const FALLBACK_SOURCE: &str = "Lightweight HTTP Performance Check";

/// Device profile for the PageSpeed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mobile" => Ok(Strategy::Mobile),
            "desktop" => Ok(Strategy::Desktop),
            other => Err(format!("unknown strategy '{other}' (expected mobile or desktop)")),
        }
    }
}

/// Measured or estimated performance of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub available: bool,
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    pub source: String,
    #[serde(default)]
    pub cached: bool,
    /// Why the fallback ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Set when even the fallback could not reach the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PerformanceResult {
    pub fn from_api(score: u32, metrics: BTreeMap<String, f64>) -> Self {
        Self {
            available: true,
            fallback: false,
            score: Some(score),
            grade: Some(Grade::from_score(score)),
            metrics,
            source: PAGESPEED_SOURCE.to_string(),
            cached: false,
            note: None,
            message: None,
        }
    }

    /// Heuristic result from a timed GET.
    pub fn estimated(ttfb: f64, size_kb: f64, reason: &str) -> Self {
        let score = pagespeed::estimate_score(ttfb, size_kb);
        let mut metrics = BTreeMap::new();
        metrics.insert("ttfb".to_string(), (ttfb * 100.0).round() / 100.0);
        metrics.insert("html_size_kb".to_string(), (size_kb * 10.0).round() / 10.0);
        Self {
            available: true,
            fallback: true,
            score: Some(score),
            grade: Some(Grade::from_score(score)),
            metrics,
            source: FALLBACK_SOURCE.to_string(),
            cached: false,
            note: Some(format!("Fallback used: {reason}")),
            message: None,
        }
    }

    pub fn unavailable(message: String) -> Self {
        Self {
            available: false,
            fallback: true,
            score: None,
            grade: None,
            metrics: BTreeMap::new(),
            source: FALLBACK_SOURCE.to_string(),
            cached: false,
            note: None,
            message: Some(format!("Fallback failed: {message}")),
        }
    }
}

/// Performance prober. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct PerformanceProber {
    client: reqwest::Client,
    api_key: Option<String>,
    settings: PerformanceSettings,
    store: Arc<PerformanceStore>,
}

impl PerformanceProber {
    pub fn new(
        api_key: Option<String>,
        settings: PerformanceSettings,
        store: Arc<PerformanceStore>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(crate::config::BROWSER_USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            settings,
            store,
        }
    }

    /// Prober with its own store sized from the settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let store = Arc::new(PerformanceStore::new(
            settings.performance.cache_ttl,
            settings.performance.cooldown,
        ));
        Self::new(
            settings.credentials.pagespeed_api_key.clone(),
            settings.performance.clone(),
            store,
        )
    }

    pub fn store(&self) -> &Arc<PerformanceStore> {
        &self.store
    }

    /// Default strategy from the settings.
    pub fn default_strategy(&self) -> Strategy {
        self.settings.strategy
    }

    /// Never fails.
    pub async fn analyze(&self, url: &str, strategy: Strategy) -> PerformanceResult {
        if let Some(hit) = self.store.get(url, strategy).await {
            debug!(url, %strategy, "performance cache hit");
            return hit;
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return self.fallback(url, "Missing PageSpeed API key").await;
        };

        if let Some(wait) = self.store.cooldown_remaining().await {
            debug!(url, ?wait, "PageSpeed cooldown active");
            return self
                .fallback(url, &format!("Cooldown active ({:.1}s)", wait.as_secs_f64()))
                .await;
        }

        let call = {
            let _permit = self.store.acquire().await;
            if let Some(hit) = self.store.get(url, strategy).await {
                debug!(url, %strategy, "performance cache filled while waiting");
                return hit;
            }
            match self.store.cooldown_remaining().await {
                Some(wait) => Err(format!("Cooldown active ({:.1}s)", wait.as_secs_f64())),
                None => {
                    self.store.stamp_call().await;
                    match self.call_pagespeed(url, strategy, api_key).await {
                        // Written under the gate; waiters re-check the cache.
                        Ok(result) => {
                            self.store.insert(url, strategy, result.clone()).await;
                            Ok(result)
                        }
                        Err(e) => Err(fallback_reason(&e)),
                    }
                }
            }
        };

        match call {
            Ok(result) => {
                info!(url, %strategy, score = ?result.score, "PageSpeed result");
                result
            }
            Err(reason) => {
                warn!(url, "PageSpeed unavailable, using fallback: {reason}");
                self.fallback(url, &reason).await
            }
        }
    }

    async fn call_pagespeed(
        &self,
        url: &str,
        strategy: Strategy,
        api_key: &str,
    ) -> Result<PerformanceResult, ServiceError> {
        let resp = self
            .client
            .get(&self.settings.endpoint)
            .query(&[
                ("url", url),
                ("strategy", strategy.as_str()),
                ("category", "performance"),
                ("key", api_key),
            ])
            .timeout(self.settings.timeout)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        match status {
            429 => Err(ServiceError::RateLimited),
            400 => Err(ServiceError::Status {
                status,
                message: pagespeed::error_message(&body).unwrap_or_else(|| "Bad request".into()),
            }),
            200..=299 => {
                let (score, metrics) = pagespeed::parse(&body)?;
                Ok(PerformanceResult::from_api(score, metrics))
            }
            _ => Err(ServiceError::Status {
                status,
                message: pagespeed::error_message(&body).unwrap_or_default(),
            }),
        }
    }

    /// Timed GET of the page. Not cached.
    async fn fallback(&self, url: &str, reason: &str) -> PerformanceResult {
        let start = Instant::now();
        let resp = self
            .client
            .get(url)
            .timeout(self.settings.fallback_timeout)
            .send()
            .await;

        let bytes = match resp {
            Ok(r) => r.bytes().await,
            Err(e) => Err(e),
        };

        match bytes {
            Ok(body) => {
                let ttfb = start.elapsed().as_secs_f64();
                let size_kb = body.len() as f64 / 1024.0;
                PerformanceResult::estimated(ttfb, size_kb, reason)
            }
            Err(e) => {
                warn!(url, "performance fallback failed: {e}");
                PerformanceResult::unavailable(e.to_string())
            }
        }
    }
}

fn fallback_reason(e: &ServiceError) -> String {
    match e {
        ServiceError::RateLimited => "PageSpeed rate limit".to_string(),
        ServiceError::Timeout => "PageSpeed timeout".to_string(),
        ServiceError::Status {
            status: 400,
            message,
        } => format!("Bad request: {message}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_and_display() {
        assert_eq!("Desktop".parse::<Strategy>().unwrap(), Strategy::Desktop);
        assert_eq!("mobile".parse::<Strategy>().unwrap(), Strategy::Mobile);
        assert!("tablet".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default().to_string(), "mobile");
    }

    #[test]
    fn test_estimated_result() {
        let r = PerformanceResult::estimated(1.8, 600.0, "Missing PageSpeed API key");
        assert!(r.available);
        assert!(r.fallback);
        assert_eq!(r.score, Some(50));
        assert_eq!(r.grade, Some(Grade::F));
        assert_eq!(r.metrics["ttfb"], 1.8);
        assert_eq!(r.metrics["html_size_kb"], 600.0);
        assert_eq!(r.note.as_deref(), Some("Fallback used: Missing PageSpeed API key"));
        assert!(!r.cached);
    }

    #[test]
    fn test_unavailable_result_shape() {
        let r = PerformanceResult::unavailable("connection refused".into());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["available"], false);
        assert_eq!(json["fallback"], true);
        assert!(json.get("score").is_none());
        assert_eq!(json["message"], "Fallback failed: connection refused");
    }

    #[test]
    fn test_fallback_reasons() {
        assert_eq!(fallback_reason(&ServiceError::RateLimited), "PageSpeed rate limit");
        assert_eq!(fallback_reason(&ServiceError::Timeout), "PageSpeed timeout");
        assert_eq!(
            fallback_reason(&ServiceError::Status {
                status: 400,
                message: "Invalid URL".into()
            }),
            "Bad request: Invalid URL"
        );
    }
}
