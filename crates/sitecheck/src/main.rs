// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sitecheck::cli;
use sitecheck::performance::Strategy;
use sitecheck::Settings;
use std::net::IpAddr;

#[derive(Parser)]
#[command(
    name = "sitecheck",
    about = "sitecheck: score a web page for performance, security, accessibility, HTML and SEO",
    version,
    after_help = "Run 'sitecheck <command> --help' for details on each command."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one page and print its report
    Analyze {
        /// URL to analyze (scheme defaults to https)
        url: String,
        /// PageSpeed device profile (mobile, desktop)
        #[arg(long)]
        strategy: Option<Strategy>,
        /// Skip Chromium and fetch over plain HTTP
        #[arg(long)]
        no_browser: bool,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the REST API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Skip Chromium and fetch over plain HTTP
        #[arg(long)]
        no_browser: bool,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    cli::output::init_logging(cli.verbose, cli.log_json);

    let settings = Settings::from_env();

    let result = match cli.command {
        Commands::Analyze {
            url,
            strategy,
            no_browser,
            json,
        } => cli::analyze_cmd::run(settings, &url, strategy, !no_browser, json).await,
        Commands::Serve {
            host,
            port,
            no_browser,
        } => cli::serve_cmd::run(settings, host, port, !no_browser).await,
        Commands::Doctor => cli::doctor::run(&settings).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sitecheck", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
