// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! `sitecheck serve`: run the REST API.

use crate::config::Settings;
use crate::orchestrator::SiteChecker;
use crate::renderer::BrowserHandle;
use crate::rest;
use anyhow::Result;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;

/// Start the REST server and block until it stops or Ctrl-C arrives.
pub async fn run(settings: Settings, host: IpAddr, port: u16, use_browser: bool) -> Result<()> {
    info!("starting sitecheck v{}", env!("CARGO_PKG_VERSION"));

    let browser = if use_browser {
        BrowserHandle::launch().await
    } else {
        BrowserHandle::unavailable()
    };
    let checker = Arc::new(SiteChecker::from_settings(&settings, &browser));

    let result = tokio::select! {
        r = rest::start(host, port, checker) => r,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    browser.shutdown().await;
    result
}
