// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! `sitecheck analyze <url>`: run the pipeline once and print the report.

use super::output;
use crate::config::Settings;
use crate::orchestrator::SiteChecker;
use crate::performance::Strategy;
use crate::renderer::BrowserHandle;
use crate::validate::normalize_url;
use anyhow::{Context, Result};

/// Run the analyze command.
pub async fn run(
    settings: Settings,
    url: &str,
    strategy: Option<Strategy>,
    use_browser: bool,
    json: bool,
) -> Result<()> {
    let url = normalize_url(url).with_context(|| format!("cannot analyze '{url}'"))?;

    let browser = if use_browser {
        BrowserHandle::launch().await
    } else {
        BrowserHandle::unavailable()
    };

    let checker = SiteChecker::from_settings(&settings, &browser);
    let strategy = strategy.unwrap_or(settings.performance.strategy);
    let outcome = checker.analyze_url_with(&url, strategy).await;

    browser.shutdown().await;

    if json {
        output::print_json(&outcome);
    } else {
        print!("{}", output::render_summary(&url, &outcome));
    }
    Ok(())
}
