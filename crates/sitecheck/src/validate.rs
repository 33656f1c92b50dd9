// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input URL normalization.

use crate::error::InputError;
use url::Url;

/// Trim, default the scheme to `https`, and accept only http(s) URLs with
/// a host. Returns the normalized URL string.
pub fn normalize_url(input: &str) -> Result<String, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| InputError::Unparseable(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(InputError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(InputError::MissingHost);
    }

    Ok(url.to_string())
}
