// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for the browser tier of the fetcher.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). The process
//! owns one renderer; every fetch opens and closes its own context.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// HTTP status of the main document response.
    pub status: u16,
    /// Main document response headers, lower-cased names.
    pub headers: BTreeMap<String, String>,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout, then wait `settle` before returning.
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
        settle: Duration,
    ) -> Result<NavigationResult>;
    /// Get the serialized DOM, doctype included.
    async fn get_html(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A no-op renderer used when Chromium is unavailable.
///
/// Every context request fails, so the fetcher goes straight to its plain
/// HTTP tier.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!("browser not available, HTTP-only mode"))
    }
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
    fn active_contexts(&self) -> usize {
        0
    }
}

/// Process-wide handle to the browser driver.
///
/// Startup and shutdown happen once at the process boundary; the fetcher
/// only asks whether a driver is available.
#[derive(Clone, Default)]
pub struct BrowserHandle {
    renderer: Option<Arc<dyn Renderer>>,
}

impl BrowserHandle {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }

    /// A handle with no browser; fetches use plain HTTP only.
    pub fn unavailable() -> Self {
        Self { renderer: None }
    }

    /// Launch Chromium, falling back to an empty handle when it cannot start.
    pub async fn launch() -> Self {
        match chromium::ChromiumRenderer::new().await {
            Ok(renderer) => {
                tracing::info!("Chromium renderer initialized");
                Self::new(Arc::new(renderer))
            }
            Err(e) => {
                tracing::warn!("failed to initialize Chromium: {e:#}");
                tracing::warn!("running in HTTP-only mode");
                Self::unavailable()
            }
        }
    }

    pub fn get(&self) -> Option<Arc<dyn Renderer>> {
        self.renderer.clone()
    }

    pub fn is_available(&self) -> bool {
        self.renderer.is_some()
    }

    pub async fn shutdown(&self) {
        if let Some(r) = &self.renderer {
            if let Err(e) = r.shutdown().await {
                tracing::warn!("browser shutdown failed: {e:#}");
            }
        }
    }
}
