// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, RenderContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Serializes the doctype (when present) followed by the root element.
const CONTENT_JS: &str = r#"(() => {
    let html = '';
    if (document.doctype) {
        html = new XMLSerializer().serializeToString(document.doctype);
    }
    if (document.documentElement) {
        html += document.documentElement.outerHTML;
    }
    return html;
})()"#;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SITECHECK_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SITECHECK_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.sitecheck/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".sitecheck/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".sitecheck/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".sitecheck/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".sitecheck/chromium/chrome-linux64/chrome"),
                home.join(".sitecheck/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a new ChromiumRenderer, launching a headless Chromium instance.
    pub async fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set SITECHECK_CHROMIUM_PATH or install Chrome.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page: Some(page),
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser is dropped when ChromiumRenderer is dropped
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium page context.
///
/// `close` releases the page; if the context is dropped without being
/// closed (for instance when the fetch future is cancelled), `Drop` spawns
/// the close instead.
pub struct ChromiumContext {
    page: Option<Page>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumContext {
    fn page(&self) -> Result<&Page> {
        self.page.as_ref().context("page already closed")
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
        settle: Duration,
    ) -> Result<NavigationResult> {
        let page = self.page()?;
        let start = Instant::now();

        let result = tokio::time::timeout(timeout, page.goto(url)).await;

        match result {
            Ok(Ok(_)) => {
                let response = page
                    .wait_for_navigation_response()
                    .await
                    .ok()
                    .flatten()
                    .and_then(|req| req.response.clone());

                let load_time_ms = start.elapsed().as_millis() as u64;

                // DOM content is in; give late scripts a bounded moment
                // instead of waiting for network idle.
                tokio::time::sleep(settle).await;

                let final_url = page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                let (status, headers) = match response {
                    Some(r) => (
                        u16::try_from(r.status).unwrap_or(200),
                        headers_from_json(r.headers.inner()),
                    ),
                    None => (200, BTreeMap::new()),
                };

                Ok(NavigationResult {
                    final_url,
                    status,
                    headers,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page()?
            .evaluate(CONTENT_JS)
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        if let Some(page) = self.page.take() {
            self.active_count.fetch_sub(1, Ordering::Relaxed);
            let _ = page.close().await;
        }
        Ok(())
    }
}

impl Drop for ChromiumContext {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            self.active_count.fetch_sub(1, Ordering::Relaxed);
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = page.close().await;
                });
            }
        }
    }
}

/// Flatten a CDP headers object into lower-cased name → value.
fn headers_from_json(value: &serde_json::Value) -> BTreeMap<String, String> {
    value
        .as_object()
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| {
                    let v = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                    (k.to_ascii_lowercase(), v)
                })
                .collect()
        })
        .unwrap_or_default()
}
