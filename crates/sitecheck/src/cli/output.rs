// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Terminal output and logging setup.

use crate::orchestrator::AnalysisOutcome;
use crate::report::ReportBundle;
use serde::Serialize;
use std::fmt::Write;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Logs go to stderr so stdout
/// stays clean for `--json` output.
pub fn init_logging(verbose: bool, json: bool) {
    let directive = if verbose {
        "sitecheck=debug"
    } else {
        "sitecheck=info"
    };
    let filter = EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into()),
    );

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("  Warning: logging already initialized: {e}");
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  Error: failed to serialize output: {e}"),
    }
}

/// Short human-readable rendering of an analysis.
pub fn render_summary(url: &str, outcome: &AnalysisOutcome) -> String {
    let mut out = String::new();
    let report = outcome.report();

    let _ = writeln!(out, "sitecheck: {url}");
    if let AnalysisOutcome::FetchFailed(e) = outcome {
        let _ = writeln!(
            out,
            "[!!] Fetch failed ({}, HTTP {}): {}",
            e.error_type, e.status, e.error_message
        );
    }
    let _ = writeln!(
        out,
        "Overall: {}/100  grade {}  ({:?})",
        report.overall_score, report.grade, report.status
    );
    let _ = writeln!(out);
    render_metrics(&mut out, report);

    if !report.highlights.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Highlights:");
        for h in &report.highlights {
            let _ = writeln!(out, "  - {h}");
        }
    }
    if !report.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recommendations:");
        for r in &report.recommendations {
            let _ = writeln!(out, "  [{:?}] {}: {}", r.priority, r.category, r.title);
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.summary);
    out
}

fn render_metrics(out: &mut String, report: &ReportBundle) {
    for m in &report.metrics {
        let _ = writeln!(
            out,
            "  {} {:<14} {:>3}  {}",
            m.icon, m.name, m.score, m.description
        );
    }
}
