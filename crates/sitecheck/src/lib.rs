// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! sitecheck: web page QA analysis pipeline.
//!
//! Fetches a page through a browser → HTTP → structured-error degradation
//! chain, runs the HTML, accessibility, security and performance analyzers
//! against it, and turns the evidence into a scored report. Every public
//! operation of the pipeline returns a complete result: external failures
//! route to local fallbacks instead of surfacing as errors.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod evidence;
pub mod fetch;
pub mod orchestrator;
pub mod page;
pub mod performance;
pub mod renderer;
pub mod report;
pub mod rest;
pub mod scoring;
pub mod validate;

pub use config::Settings;
pub use orchestrator::{AnalysisOutcome, ErrorReportBundle, SiteChecker};
pub use report::ReportBundle;
