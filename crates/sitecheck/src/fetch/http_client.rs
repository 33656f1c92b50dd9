// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Plain HTTP tier of the fetcher, wrapping reqwest.
//!
//! Not a browser: no script runs. Sends browser-like headers, follows up to
//! 10 redirects, and treats any status of 400 or above as a failure.

use crate::page::RawPage;
use anyhow::{bail, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

const MAX_REDIRECTS: usize = 10;

/// HTTP client for the fallback tier.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    /// HTTP/1.1-only client for servers that reject HTTP/2.
    h1_client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let build = |h1_only: bool| {
            let mut builder = reqwest::Client::builder()
                .timeout(timeout)
                .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
                .user_agent(user_agent)
                .default_headers(headers.clone());
            if h1_only {
                builder = builder.http1_only();
            }
            builder.build().unwrap_or_default()
        };

        Self {
            client: build(false),
            h1_client: build(true),
        }
    }

    /// Perform one GET.
    ///
    /// Falls back to HTTP/1.1 on protocol errors (some CDNs reject HTTP/2).
    /// Retries across rounds are the caller's concern.
    pub async fn get(&self, url: &str) -> Result<RawPage> {
        match self.get_inner(&self.client, url).await {
            Ok(page) => Ok(page),
            Err(e) => {
                let err_str = format!("{e:#}");
                if err_str.contains("http2")
                    || err_str.contains("protocol")
                    || err_str.contains("connection closed")
                {
                    self.get_inner(&self.h1_client, url).await
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn get_inner(&self, client: &reqwest::Client, url: &str) -> Result<RawPage> {
        let start = Instant::now();
        // Error text is classified downstream; the URL must not leak into it.
        let r = client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = r.status().as_u16();
        if status >= 400 {
            bail!("HTTP {status}");
        }

        let final_url = r.url().to_string();
        let headers: BTreeMap<String, String> = r
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_ascii_lowercase(),
                    v.to_str().unwrap_or("").to_string(),
                )
            })
            .collect();

        let html = r.text().await.map_err(reqwest::Error::without_url)?;

        Ok(RawPage {
            final_url,
            status,
            html,
            headers,
            load_time_secs: start.elapsed().as_secs_f64(),
        })
    }
}
