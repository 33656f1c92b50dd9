// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! PageSpeed Insights response parsing and the local score heuristic.

use crate::error::ServiceError;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Deserialize)]
struct PageSpeedResponse {
    #[serde(rename = "lighthouseResult")]
    lighthouse: Option<Lighthouse>,
}

#[derive(Debug, Default, Deserialize)]
struct Lighthouse {
    #[serde(default)]
    categories: HashMap<String, LighthouseCategory>,
    #[serde(default)]
    audits: HashMap<String, Audit>,
}

#[derive(Debug, Deserialize)]
struct LighthouseCategory {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Audit {
    #[serde(rename = "numericValue")]
    numeric_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Performance score (0–100) and the four lab metrics.
///
/// `lcp` and `fcp` are reported in seconds, `cls` unitless, `tbt` in
/// milliseconds. A response without a performance score is malformed.
pub fn parse(body: &str) -> Result<(u32, BTreeMap<String, f64>), ServiceError> {
    let resp: PageSpeedResponse = serde_json::from_str(body)?;
    let lighthouse = resp
        .lighthouse
        .ok_or_else(|| ServiceError::Malformed("missing lighthouseResult".to_string()))?;

    let score = lighthouse
        .categories
        .get("performance")
        .and_then(|c| c.score)
        .ok_or_else(|| ServiceError::Malformed("missing performance score".to_string()))?;
    let score = (score * 100.0).round().clamp(0.0, 100.0) as u32;

    let audit = |name: &str| {
        lighthouse
            .audits
            .get(name)
            .and_then(|a| a.numeric_value)
            .unwrap_or(0.0)
    };

    let mut metrics = BTreeMap::new();
    metrics.insert("lcp".to_string(), audit("largest-contentful-paint") / 1000.0);
    metrics.insert("fcp".to_string(), audit("first-contentful-paint") / 1000.0);
    metrics.insert("cls".to_string(), audit("cumulative-layout-shift"));
    metrics.insert("tbt".to_string(), audit("total-blocking-time"));

    Ok((score, metrics))
}

/// `error.message` of an API error body, if there is one.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()?
        .error?
        .message
}

/// Heuristic score from time-to-first-byte (seconds) and HTML size (KB).
pub fn estimate_score(ttfb: f64, size_kb: f64) -> u32 {
    let mut score: i32 = 100;

    if ttfb > 1.5 {
        score -= 30;
    } else if ttfb > 1.0 {
        score -= 20;
    } else if ttfb > 0.7 {
        score -= 10;
    }

    if size_kb > 500.0 {
        score -= 20;
    } else if size_kb > 300.0 {
        score -= 10;
    }

    score.clamp(30, 100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let body = r#"{
            "lighthouseResult": {
                "categories": {"performance": {"score": 0.87}},
                "audits": {
                    "largest-contentful-paint": {"numericValue": 2500.0},
                    "first-contentful-paint": {"numericValue": 1200.0},
                    "cumulative-layout-shift": {"numericValue": 0.05},
                    "total-blocking-time": {"numericValue": 150.0}
                }
            }
        }"#;
        let (score, metrics) = parse(body).unwrap();
        assert_eq!(score, 87);
        assert_eq!(metrics["lcp"], 2.5);
        assert_eq!(metrics["fcp"], 1.2);
        assert_eq!(metrics["cls"], 0.05);
        assert_eq!(metrics["tbt"], 150.0);
    }

    #[test]
    fn test_missing_score_is_malformed() {
        let body = r#"{"lighthouseResult": {"categories": {}, "audits": {}}}"#;
        assert!(matches!(parse(body), Err(ServiceError::Malformed(_))));
        assert!(matches!(parse("{}"), Err(ServiceError::Malformed(_))));
        assert!(matches!(parse("not json"), Err(ServiceError::Malformed(_))));
    }

    #[test]
    fn test_missing_audits_default_to_zero() {
        let body = r#"{"lighthouseResult": {"categories": {"performance": {"score": 1.0}}}}"#;
        let (score, metrics) = parse(body).unwrap();
        assert_eq!(score, 100);
        assert_eq!(metrics["lcp"], 0.0);
    }

    #[test]
    fn test_estimate_score() {
        assert_eq!(estimate_score(0.2, 50.0), 100);
        assert_eq!(estimate_score(0.8, 50.0), 90);
        assert_eq!(estimate_score(1.2, 350.0), 70);
        assert_eq!(estimate_score(1.8, 600.0), 50);
        assert_eq!(estimate_score(99.0, 9999.0), 50);
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error": {"code": 400, "message": "Invalid URL"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid URL"));
        assert!(error_message("garbage").is_none());
    }
}
