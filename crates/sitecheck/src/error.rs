// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by the external-service clients and the fetcher.
//!
//! None of these cross the public boundary of the pipeline: each component
//! converts them into its fallback result and logs the reason.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure of a call to a third-party API (validator, PageSpeed, VirusTotal,
/// Anthropic).
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("service disabled by configuration")]
    Disabled,

    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_decode() {
            ServiceError::Malformed(e.to_string())
        } else {
            ServiceError::Transport(e)
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Malformed(e.to_string())
    }
}

/// Category of a failed page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    DnsError,
    Timeout,
    SslError,
    ConnectionRefused,
    FetchFailed,
}

impl FetchErrorKind {
    /// Representative HTTP status shown downstream for this failure.
    pub fn status_code(self) -> u16 {
        match self {
            FetchErrorKind::DnsError => 404,
            FetchErrorKind::Timeout => 408,
            FetchErrorKind::SslError => 526,
            FetchErrorKind::ConnectionRefused => 503,
            FetchErrorKind::FetchFailed => 500,
        }
    }

    /// Snake-case tag, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            FetchErrorKind::DnsError => "dns_error",
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::SslError => "ssl_error",
            FetchErrorKind::ConnectionRefused => "connection_refused",
            FetchErrorKind::FetchFailed => "fetch_failed",
        }
    }

    /// Whether another retry round is pointless for this kind.
    pub fn is_permanent(self) -> bool {
        matches!(self, FetchErrorKind::DnsError)
    }

    /// Classify a fetch error from its cause chain.
    ///
    /// Timeouts and refused connections are read from the reqwest and
    /// `io::Error` causes; anything else falls back to [`classify`](Self::classify)
    /// on the rendered chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
                if e.is_timeout() {
                    return FetchErrorKind::Timeout;
                }
            }
            if let Some(e) = cause.downcast_ref::<std::io::Error>() {
                match e.kind() {
                    std::io::ErrorKind::ConnectionRefused => {
                        return FetchErrorKind::ConnectionRefused
                    }
                    std::io::ErrorKind::TimedOut => return FetchErrorKind::Timeout,
                    _ => {}
                }
            }
        }
        Self::classify(&format!("{err:#}"))
    }

    /// Classify an error chain rendered as text. The text must not contain
    /// the request URL.
    ///
    /// Both reqwest/hyper and Chromium (`net::ERR_*`) messages are recognized.
    pub fn classify(message: &str) -> Self {
        let m = message.to_ascii_lowercase();
        if m.contains("dns error")
            || m.contains("failed to lookup address")
            || m.contains("name or service not known")
            || m.contains("nodename nor servname")
            || m.contains("no such host")
            || m.contains("err_name_not_resolved")
            || m.contains("temporary failure in name resolution")
        {
            FetchErrorKind::DnsError
        } else if m.contains("timed out") || m.contains("timeout") || m.contains("err_timed_out") {
            FetchErrorKind::Timeout
        } else if m.contains("certificate")
            || m.contains("ssl")
            || m.contains("tls")
            || m.contains("err_cert")
        {
            FetchErrorKind::SslError
        } else if m.contains("connection refused") || m.contains("err_connection_refused") {
            FetchErrorKind::ConnectionRefused
        } else {
            FetchErrorKind::FetchFailed
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected user input (outside the core).
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("URL is empty")]
    Empty,

    #[error("invalid URL: {0}")]
    Unparseable(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_map() {
        assert_eq!(FetchErrorKind::DnsError.status_code(), 404);
        assert_eq!(FetchErrorKind::Timeout.status_code(), 408);
        assert_eq!(FetchErrorKind::SslError.status_code(), 526);
        assert_eq!(FetchErrorKind::ConnectionRefused.status_code(), 503);
        assert_eq!(FetchErrorKind::FetchFailed.status_code(), 500);
    }

    #[test]
    fn test_classify_reqwest_messages() {
        assert_eq!(
            FetchErrorKind::classify(
                "error sending request: client error (Connect): dns error: failed to lookup address information"
            ),
            FetchErrorKind::DnsError
        );
        assert_eq!(
            FetchErrorKind::classify("error sending request: operation timed out"),
            FetchErrorKind::Timeout
        );
        assert_eq!(
            FetchErrorKind::classify("tcp connect error: Connection refused (os error 111)"),
            FetchErrorKind::ConnectionRefused
        );
        assert_eq!(
            FetchErrorKind::classify("invalid peer certificate: UnknownIssuer"),
            FetchErrorKind::SslError
        );
        assert_eq!(FetchErrorKind::classify("HTTP 404"), FetchErrorKind::FetchFailed);
    }

    #[test]
    fn test_classify_chromium_messages() {
        assert_eq!(
            FetchErrorKind::classify("navigation failed: net::ERR_NAME_NOT_RESOLVED"),
            FetchErrorKind::DnsError
        );
        assert_eq!(
            FetchErrorKind::classify("net::ERR_CONNECTION_REFUSED"),
            FetchErrorKind::ConnectionRefused
        );
        assert_eq!(
            FetchErrorKind::classify("navigation timed out after 60000ms"),
            FetchErrorKind::Timeout
        );
    }

    #[test]
    fn test_from_error_prefers_io_kind_over_text() {
        let refused = anyhow::Error::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connect failed",
        ))
        .context("while loading the ssl certificate timeout guide");
        assert_eq!(
            FetchErrorKind::from_error(&refused),
            FetchErrorKind::ConnectionRefused
        );

        let timed_out = anyhow::Error::new(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "deadline",
        ));
        assert_eq!(FetchErrorKind::from_error(&timed_out), FetchErrorKind::Timeout);

        let status = anyhow::anyhow!("HTTP 502");
        assert_eq!(FetchErrorKind::from_error(&status), FetchErrorKind::FetchFailed);
    }

    #[test]
    fn test_only_dns_is_permanent() {
        assert!(FetchErrorKind::DnsError.is_permanent());
        assert!(!FetchErrorKind::Timeout.is_permanent());
        assert!(!FetchErrorKind::FetchFailed.is_permanent());
    }
}
