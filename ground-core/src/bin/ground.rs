//! Command-line runner.
//!
//! Replays a built-in scenario against the registered adapters, prints the
//! summary and exits with status 1 if any adapter failed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ground_core::adapters;
use ground_core::config::HarnessConfig;
use ground_core::contract::{capability_gaps, Framework};
use ground_core::harness::{RunOptions, Runner};
use ground_core::scenario::Builtin;

#[derive(Parser)]
#[command(name = "ground")]
#[command(about = "Run one signal scenario against several reactive libraries", long_about = None)]
struct Cli {
    /// Built-in scenario: basics, playground or conformance
    #[arg(short, long)]
    scenario: Option<Builtin>,

    /// Only run this adapter (repeatable)
    #[arg(short, long = "adapter")]
    adapters: Vec<String>,

    /// List registered adapters and exit
    #[arg(long)]
    list: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Do not echo scenario output while it runs
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, default_value = "ground.toml")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = HarnessConfig::load_or_default(&cli.config)?;
    config.merge_env()?;
    if let Some(scenario) = cli.scenario {
        config.scenario = scenario;
    }
    if !cli.adapters.is_empty() {
        config.adapters = cli.adapters;
    }
    config.json |= cli.json;
    if cli.quiet {
        config.echo = false;
    }

    let registry = adapters::registry();
    if cli.list {
        for adapter in &registry {
            let gaps: Vec<_> = capability_gaps(adapter)
                .iter()
                .map(|gap| gap.describe())
                .collect();
            if gaps.is_empty() {
                println!("{}", adapter.name());
            } else {
                println!("{} ({})", adapter.name(), gaps.join("; "));
            }
        }
        return Ok(ExitCode::SUCCESS);
    }
    let registry = registry
        .select(&config.adapters)
        .context("invalid adapter selection")?;

    let runner = Runner::new(registry).with_options(RunOptions { echo: config.echo });
    let report = runner
        .run(&config.scenario)
        .await
        .with_context(|| format!("running scenario `{}`", config.scenario))?;

    if config.json {
        println!("{}", report.to_json()?);
    } else {
        if !config.echo {
            for result in &report.results {
                println!("=== {} ===", result.adapter);
                for line in result.output_lines() {
                    println!("{line}");
                }
                println!();
            }
        }
        print!("{report}");
    }

    Ok(ExitCode::from(report.exit_code()))
}
