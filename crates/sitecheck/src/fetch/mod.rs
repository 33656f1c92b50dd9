// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page fetcher: browser → plain HTTP → structured error.
//!
//! Each round tries the browser tier (when a renderer is available) and then
//! the HTTP tier. A round that fails on both is retried with exponential
//! backoff up to `max_retries` extra rounds, except for DNS failures which
//! are returned at once.

pub mod http_client;

use crate::config::FetchSettings;
use crate::error::FetchErrorKind;
use crate::page::{FetchFailure, FetchOutcome, FetchTier, FetchedPage, RawPage};
use crate::renderer::{RenderContext, Renderer};
use anyhow::bail;
use http_client::HttpClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches pages through the degradation chain.
#[derive(Clone)]
pub struct PageFetcher {
    renderer: Option<Arc<dyn Renderer>>,
    http: HttpClient,
    settings: FetchSettings,
}

impl PageFetcher {
    pub fn new(renderer: Option<Arc<dyn Renderer>>, settings: FetchSettings) -> Self {
        let http = HttpClient::new(&settings.user_agent, settings.http_timeout);
        Self {
            renderer,
            http,
            settings,
        }
    }

    /// Fetch a page. Never fails: a failed fetch is the error variant.
    pub async fn fetch(&self, url: &str) -> FetchedPage {
        self.fetch_outcome(url).await.into_page()
    }

    /// Fetch a page, reporting which tier delivered it.
    pub async fn fetch_outcome(&self, url: &str) -> FetchOutcome {
        let mut attempt: u32 = 0;
        loop {
            let failure = match self.fetch_round(url).await {
                Ok(outcome) => return outcome,
                Err(failure) => failure,
            };

            if failure.kind.is_permanent() {
                warn!(url, kind = %failure.kind, "fetch failed permanently: {}", failure.message);
                return FetchOutcome::Failed(failure);
            }
            if attempt >= self.settings.max_retries {
                warn!(
                    url,
                    kind = %failure.kind,
                    rounds = attempt + 1,
                    "fetch failed after all retries: {}",
                    failure.message
                );
                return FetchOutcome::Failed(failure);
            }

            let delay = self.settings.backoff_base * 2u32.saturating_pow(attempt);
            debug!(url, attempt, ?delay, "retrying fetch after backoff");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One pass over both tiers.
    async fn fetch_round(&self, url: &str) -> Result<FetchOutcome, FetchFailure> {
        let browser_note = match &self.renderer {
            Some(renderer) => match self.browser_fetch(renderer.as_ref(), url).await {
                Ok(raw) => {
                    info!(url, "fetched with browser");
                    return Ok(FetchOutcome::Success(FetchedPage::from_html(
                        url,
                        raw,
                        FetchTier::Browser,
                    )));
                }
                Err(e) => {
                    let note = format!("browser fetch failed: {e:#}");
                    warn!(url, "{note}, falling back to HTTP");
                    note
                }
            },
            None => "browser unavailable".to_string(),
        };

        match self.http.get(url).await {
            Ok(raw) => {
                info!(url, "fetched with plain HTTP");
                Ok(FetchOutcome::Degraded(
                    FetchedPage::from_html(url, raw, FetchTier::Http),
                    browser_note,
                ))
            }
            Err(e) => {
                let message = format!("{e:#}");
                let kind = FetchErrorKind::from_error(&e);
                warn!(url, %kind, "HTTP fetch failed: {message}");
                Err(FetchFailure::new(url, kind, message))
            }
        }
    }

    /// Browser tier. The context is closed on every path out.
    async fn browser_fetch(&self, renderer: &dyn Renderer, url: &str) -> anyhow::Result<RawPage> {
        let mut ctx = renderer.new_context().await?;
        let result = self.render(ctx.as_mut(), url).await;
        if let Err(e) = ctx.close().await {
            warn!("failed to close browser context: {e:#}");
        }
        result
    }

    async fn render(&self, ctx: &mut dyn RenderContext, url: &str) -> anyhow::Result<RawPage> {
        let nav = ctx
            .navigate(
                url,
                self.settings.navigation_timeout,
                self.settings.settle_delay,
            )
            .await?;
        if nav.status >= 400 {
            bail!("HTTP {}", nav.status);
        }
        let html = ctx.get_html().await?;
        Ok(RawPage {
            final_url: nav.final_url,
            status: nav.status,
            html,
            headers: nav.headers,
            load_time_secs: nav.load_time_ms as f64 / 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::NoopRenderer;
    use std::time::Duration;

    fn fast_settings(retries: u32) -> FetchSettings {
        FetchSettings {
            http_timeout: Duration::from_secs(2),
            max_retries: retries,
            backoff_base: Duration::from_millis(10),
            ..FetchSettings::default()
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_structured_error() {
        // Port 9 on loopback is reliably closed in test environments.
        let fetcher = PageFetcher::new(Some(Arc::new(NoopRenderer)), fast_settings(1));
        let page = fetcher.fetch("http://127.0.0.1:9/").await;
        assert!(page.is_error());
        assert_eq!(page.error_kind(), Some(FetchErrorKind::ConnectionRefused));
        assert_eq!(page.status_code, 503);
        assert_eq!(page.url, "http://127.0.0.1:9/");
    }

    #[tokio::test]
    async fn test_url_words_do_not_change_error_kind() {
        let fetcher = PageFetcher::new(None, fast_settings(0));
        for path in ["tls-guide", "timeout-page", "ssl-certificate", "dns-error-help"] {
            let url = format!("http://127.0.0.1:9/{path}");
            let page = fetcher.fetch(&url).await;
            assert_eq!(
                page.error_kind(),
                Some(FetchErrorKind::ConnectionRefused),
                "{url}"
            );
            assert_eq!(page.status_code, 503, "{url}");
        }
    }
}
