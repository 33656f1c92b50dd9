//! Reputation and markup-validator clients against mocked services.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitecheck::analysis::html_bugs::HtmlBugsAnalyzer;
use sitecheck::analysis::reputation::{url_id, ReputationService, VirusTotalClient};
use sitecheck::analysis::security::SecurityAnalyzer;
use sitecheck::analysis::Severity;
use sitecheck::config::{ReputationSettings, ValidatorSettings};
use sitecheck::page::Document;

// ─────────────────────── helpers ───────────────────────

const TARGET: &str = "https://shop.example/";

fn virustotal(server: &MockServer) -> Arc<dyn ReputationService> {
    let settings = ReputationSettings {
        endpoint: server.uri(),
        timeout: Duration::from_secs(5),
    };
    Arc::new(VirusTotalClient::new("vt-key", &settings))
}

fn stats(malicious: u64, suspicious: u64) -> serde_json::Value {
    json!({
        "data": { "attributes": { "last_analysis_stats": {
            "malicious": malicious,
            "suspicious": suspicious,
            "harmless": 70,
            "undetected": 12
        }}}
    })
}

fn hardened_headers() -> BTreeMap<String, String> {
    [
        "strict-transport-security",
        "content-security-policy",
        "x-frame-options",
        "x-content-type-options",
        "referrer-policy",
    ]
    .into_iter()
    .map(|h| (h.to_string(), "set".to_string()))
    .collect()
}

fn validator(server: &MockServer) -> HtmlBugsAnalyzer {
    HtmlBugsAnalyzer::new(ValidatorSettings {
        endpoint: Some(format!("{}/nu/", server.uri())),
        timeout: Duration::from_secs(5),
    })
}

// ─────────────────────── reputation ───────────────────────

#[tokio::test]
async fn test_unknown_url_is_submitted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/urls/{}", url_id(TARGET))))
        .and(header("x-apikey", "vt-key"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/urls"))
        .and(header("x-apikey", "vt-key"))
        .and(body_string_contains("url=https%3A%2F%2Fshop.example%2F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = SecurityAnalyzer::new(Some(virustotal(&server)));
    let doc = Document::parse("<html><body></body></html>");
    let result = analyzer.analyze(&doc, TARGET, &hardened_headers()).await;

    assert_eq!(result.primary_check, "VirusTotal");
    assert!(!result.fallback_used);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, Severity::Info);
    assert_eq!(
        result.issues[0].message,
        "URL submitted to VirusTotal for analysis"
    );
}

#[tokio::test]
async fn test_flagged_url_short_circuits_static_checks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/urls/{}", url_id("http://shady.example/"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats(3, 1)))
        .mount(&server)
        .await;

    let analyzer = SecurityAnalyzer::new(Some(virustotal(&server)));
    let doc = Document::parse("<script>alert(1)</script>");
    // Plain HTTP, no headers, inline script: none of it is reported.
    let result = analyzer
        .analyze(&doc, "http://shady.example/", &BTreeMap::new())
        .await;

    assert_eq!(result.issues.len(), 1);
    let record = &result.issues[0];
    assert_eq!(record.severity, Severity::Critical);
    assert_eq!(record.message, "URL flagged as malicious or suspicious");
    assert_eq!(record.count, Some(4));
    assert_eq!(record.samples[0], "malicious: 3");
}

#[tokio::test]
async fn test_clean_verdict_keeps_static_findings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats(0, 0)))
        .mount(&server)
        .await;

    let analyzer = SecurityAnalyzer::new(Some(virustotal(&server)));
    let doc = Document::parse("<p>hi</p>");
    let mut headers = hardened_headers();
    headers.remove("referrer-policy");
    let result = analyzer.analyze(&doc, TARGET, &headers).await;

    let messages: Vec<&str> = result.issues.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "URL not flagged by VirusTotal",
            "Missing security headers: Referrer-Policy"
        ]
    );
}

#[tokio::test]
async fn test_rate_limited_reputation_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let analyzer = SecurityAnalyzer::new(Some(virustotal(&server)));
    let doc = Document::parse("<p>hi</p>");
    let result = analyzer.analyze(&doc, TARGET, &hardened_headers()).await;

    assert!(result.fallback_used);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].message, "No security issues detected");
}

// ─────────────────────── markup validator ───────────────────────

#[tokio::test]
async fn test_validator_messages_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nu/"))
        .and(query_param("out", "json"))
        .and(header("content-type", "text/html; charset=utf-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                { "type": "error", "message": "Stray end tag “div”.", "extract": "  </div>  " },
                { "type": "warning", "message": "Consider adding a “lang” attribute." },
                { "type": "info", "subType": "warning", "message": "Trailing slash on void elements has no effect." },
                { "type": "info", "message": "Document checking completed." },
                { "type": "non-document-error", "message": "IO error" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let issues = validator(&server).analyze("<p>x</p></div>").await;
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].severity, Severity::Error);
    assert_eq!(issues[0].message, "Stray end tag “div”.");
    assert_eq!(issues[0].samples, vec!["</div>".to_string()]);
    assert_eq!(issues[0].source.as_deref(), Some("validator"));
    assert_eq!(issues[1].severity, Severity::Warning);
}

#[tokio::test]
async fn test_clean_validator_output_is_single_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [] })))
        .mount(&server)
        .await;

    let issues = validator(&server).analyze("<!DOCTYPE html><title>x</title>").await;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Info);
    assert_eq!(issues[0].message, "No HTML bugs found");
}

#[tokio::test]
async fn test_validator_outage_uses_local_checks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let html = "<html><body><img src=a.png></body></html>";
    let issues = validator(&server).analyze(html).await;
    assert_eq!(issues, sitecheck::analysis::html_bugs::local_checks(html));
    assert_eq!(issues[0].message, "Missing DOCTYPE declaration");
    assert!(issues.iter().all(|i| i.source.is_none()));
}

#[tokio::test]
async fn test_validator_without_messages_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": "x" })))
        .mount(&server)
        .await;

    let issues = validator(&server).analyze("<!DOCTYPE html>").await;
    assert_eq!(issues[0].message, "Missing <html> element");
}
