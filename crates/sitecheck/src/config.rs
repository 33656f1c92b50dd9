// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Settings: optional credentials plus per-component timeouts and endpoints.
//!
//! `Settings::default()` carries the production values; `from_env()` layers
//! the three credentials and `SITECHECK_*` overrides on top. A missing or
//! blank credential is never an error; it routes that component to its
//! local fallback.

use crate::performance::Strategy;
use std::time::Duration;

/// Nu HTML checker endpoint.
pub const DEFAULT_VALIDATOR_URL: &str = "https://validator.w3.org/nu/";

/// PageSpeed Insights v5 endpoint.
pub const DEFAULT_PAGESPEED_URL: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// VirusTotal v3 API base.
pub const DEFAULT_VIRUSTOTAL_URL: &str = "https://www.virustotal.com/api/v3";

/// Anthropic Messages API base.
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1";

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// User agent sent by the HTTP tier and the performance fallback.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/131.0.0.0 Safari/537.36";

/// Credentials for the four API-backed components.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub pagespeed_api_key: Option<String>,
    pub virustotal_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

/// Page fetcher tuning.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Browser navigation timeout.
    pub navigation_timeout: Duration,
    /// Pause after load before the DOM is captured.
    pub settle_delay: Duration,
    /// Plain HTTP tier timeout.
    pub http_timeout: Duration,
    /// Extra rounds after the first one.
    pub max_retries: u32,
    /// Backoff before round `n + 1` is `backoff_base * 2^n`.
    pub backoff_base: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_millis(1500),
            http_timeout: Duration::from_secs(20),
            max_retries: 2,
            backoff_base: Duration::from_secs(1),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// Markup validator settings. `endpoint: None` disables the remote check.
#[derive(Debug, Clone)]
pub struct ValidatorSettings {
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            endpoint: Some(DEFAULT_VALIDATOR_URL.to_string()),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Performance prober settings.
#[derive(Debug, Clone)]
pub struct PerformanceSettings {
    pub endpoint: String,
    pub strategy: Strategy,
    pub timeout: Duration,
    pub fallback_timeout: Duration,
    /// Minimum interval between two PageSpeed calls, across all URLs.
    pub cooldown: Duration,
    pub cache_ttl: Duration,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PAGESPEED_URL.to_string(),
            strategy: Strategy::Mobile,
            timeout: Duration::from_secs(60),
            fallback_timeout: Duration::from_secs(20),
            cooldown: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(6 * 60 * 60),
        }
    }
}

/// URL reputation service settings.
#[derive(Debug, Clone)]
pub struct ReputationSettings {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ReputationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_VIRUSTOTAL_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Report generation API settings.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ANTHROPIC_URL.to_string(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

/// All pipeline settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub credentials: Credentials,
    pub fetch: FetchSettings,
    pub validator: ValidatorSettings,
    pub performance: PerformanceSettings,
    pub reputation: ReputationSettings,
    pub report: ReportSettings,
}

impl Settings {
    /// Load credentials and overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let millis = |key: &str| {
            get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        let mut settings = Settings {
            credentials: Credentials {
                pagespeed_api_key: get("GOOGLE_PAGESPEED_API_KEY"),
                virustotal_api_key: get("VIRUSTOTAL_API_KEY"),
                anthropic_api_key: get("ANTHROPIC_API_KEY"),
            },
            ..Settings::default()
        };

        if let Some(v) = get("SITECHECK_VALIDATOR_URL") {
            settings.validator.endpoint = if v.eq_ignore_ascii_case("off") {
                None
            } else {
                Some(v)
            };
        }
        if let Some(v) = get("SITECHECK_PAGESPEED_URL") {
            settings.performance.endpoint = v;
        }
        if let Some(v) = get("SITECHECK_PAGESPEED_COOLDOWN_SECS").and_then(|v| v.parse().ok()) {
            settings.performance.cooldown = Duration::from_secs(v);
        }
        if let Some(v) = get("SITECHECK_VIRUSTOTAL_URL") {
            settings.reputation.endpoint = v;
        }
        if let Some(v) = get("SITECHECK_ANTHROPIC_URL") {
            settings.report.endpoint = v;
        }
        if let Some(v) = get("SITECHECK_ANTHROPIC_MODEL") {
            settings.report.model = v;
        }
        if let Some(v) = get("SITECHECK_FETCH_RETRIES").and_then(|v| v.parse().ok()) {
            settings.fetch.max_retries = v;
        }
        if let Some(d) = millis("SITECHECK_NAV_TIMEOUT_MS") {
            settings.fetch.navigation_timeout = d;
        }
        if let Some(d) = millis("SITECHECK_HTTP_TIMEOUT_MS") {
            settings.fetch.http_timeout = d;
        }

        settings
    }

    /// Names of the credentials that are configured, for diagnostics.
    /// Never includes the secret values.
    pub fn configured_credentials(&self) -> Vec<&'static str> {
        let c = &self.credentials;
        [
            ("GOOGLE_PAGESPEED_API_KEY", c.pagespeed_api_key.is_some()),
            ("VIRUSTOTAL_API_KEY", c.virustotal_api_key.is_some()),
            ("ANTHROPIC_API_KEY", c.anthropic_api_key.is_some()),
        ]
        .into_iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.fetch.max_retries, 2);
        assert_eq!(s.fetch.navigation_timeout, Duration::from_secs(60));
        assert_eq!(s.fetch.http_timeout, Duration::from_secs(20));
        assert_eq!(s.performance.cooldown, Duration::from_secs(10));
        assert_eq!(s.performance.cache_ttl, Duration::from_secs(21_600));
        assert_eq!(s.report.timeout, Duration::from_secs(60));
        assert!(s.credentials.anthropic_api_key.is_none());
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let s = Settings::from_lookup(lookup(&[
            ("GOOGLE_PAGESPEED_API_KEY", "   "),
            ("VIRUSTOTAL_API_KEY", "vt-key"),
        ]));
        assert!(s.credentials.pagespeed_api_key.is_none());
        assert_eq!(s.credentials.virustotal_api_key.as_deref(), Some("vt-key"));
        assert_eq!(s.configured_credentials(), vec!["VIRUSTOTAL_API_KEY"]);
    }

    #[test]
    fn test_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("SITECHECK_VALIDATOR_URL", "off"),
            ("SITECHECK_FETCH_RETRIES", "0"),
            ("SITECHECK_HTTP_TIMEOUT_MS", "1500"),
            ("SITECHECK_PAGESPEED_COOLDOWN_SECS", "3"),
        ]));
        assert!(s.validator.endpoint.is_none());
        assert_eq!(s.fetch.max_retries, 0);
        assert_eq!(s.fetch.http_timeout, Duration::from_millis(1500));
        assert_eq!(s.performance.cooldown, Duration::from_secs(3));
    }
}
