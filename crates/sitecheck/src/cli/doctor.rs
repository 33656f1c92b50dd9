// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use crate::config::Settings;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;

const CREDENTIALS: [(&str, &str); 3] = [
    ("GOOGLE_PAGESPEED_API_KEY", "performance uses the local timing heuristic"),
    ("VIRUSTOTAL_API_KEY", "security uses static checks only"),
    ("ANTHROPIC_API_KEY", "reports use local scoring"),
];

/// Check Chromium availability and which credentials are configured.
pub async fn run(settings: &Settings) -> Result<()> {
    println!("sitecheck doctor");
    println!("================");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Set SITECHECK_CHROMIUM_PATH; pages will be fetched over plain HTTP."
        ),
    }

    let configured = settings.configured_credentials();
    for (name, fallback) in CREDENTIALS {
        if configured.contains(&name) {
            println!("[OK] {name} is set");
        } else {
            println!("[!!] {name} not set: {fallback}");
        }
    }

    match &settings.validator.endpoint {
        Some(url) => println!("[OK] Markup validator: {url}"),
        None => println!("[!!] Markup validator disabled: local HTML checks only"),
    }

    println!();
    if chromium_path.is_some() && configured.len() == CREDENTIALS.len() {
        println!("Status: READY");
    } else {
        println!("Status: DEGRADED (analysis still runs with local fallbacks)");
    }

    Ok(())
}
