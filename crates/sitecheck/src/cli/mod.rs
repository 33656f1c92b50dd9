// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the sitecheck binary.

pub mod analyze_cmd;
pub mod doctor;
pub mod output;
pub mod serve_cmd;
