use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

use sentinel::config::Config;
use sentinel::fs::{HistoryLog, StateStore};
use sentinel::logging::init_logging;
use sentinel::models::Severity;
use sentinel::monitor::{CycleOptions, CycleReport, MetricsCollector, Monitor};
use sentinel::notify::{MessageFormatter, TelegramNotifier};
use sentinel::source::{CliSource, HttpSource};

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "Single-validator health monitor with chat notifications", long_about = None)]
#[command(version)]
struct Cli {
    /// Send the alert message for ALERT/FATAL even if the severity did not change
    #[arg(long)]
    force: bool,

    /// Print the messages that would be sent; send nothing and write no files
    #[arg(long)]
    dry_run: bool,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Override STATE_FILE
    #[arg(long, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Override HISTORY_FILE
    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// Log per-query detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    });

    load_env_file(cli.env_file.as_deref());

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.state_file.clone() {
        config.state_file = path;
    }
    if let Some(path) = cli.history_file.clone() {
        config.history_file = path;
    }

    match run(&config, &cli) {
        Ok(report) => {
            if cli.dry_run {
                print_dry_run(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// A missing default `.env` is normal; an explicit `--env-file` that cannot be read is not.
fn load_env_file(path: Option<&std::path::Path>) {
    match path {
        Some(path) => {
            if let Err(e) = dotenvy::from_path(path) {
                warn!("Could not load {}: {e}", path.display());
            }
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }
}

fn run(config: &Config, cli: &Cli) -> Result<CycleReport> {
    let http = HttpSource::new(&config.chain.rpc_url, &config.chain.lcd_url)?;
    let mut collector = MetricsCollector::new(
        Box::new(http),
        config.validator.clone(),
        config.chain.denom.clone(),
    );

    let node_cli = CliSource::new(config.fallback.binary.clone(), config.fallback.home.clone())
        .with_chain_id(config.chain.chain_id.clone());
    if node_cli.is_available() {
        collector = collector.with_fallback(Box::new(node_cli));
    } else {
        info!(
            "{} not found, running without the node binary fallback",
            config.fallback.binary
        );
    }

    let monitor = Monitor::new(
        collector,
        Box::new(TelegramNotifier::new(&config.telegram)?),
        MessageFormatter::from_config(config),
        StateStore::new(config.state_file.clone()),
        HistoryLog::new(config.history_file.clone()),
        config.heartbeat_interval,
    );

    Ok(monitor.run_cycle(CycleOptions {
        force: cli.force,
        dry_run: cli.dry_run,
    }))
}

fn print_dry_run(report: &CycleReport) {
    let severity = report.classification.severity;
    let label = match severity {
        Severity::Fatal | Severity::Alert => severity.as_str().red().bold(),
        Severity::Warning => severity.as_str().yellow().bold(),
        Severity::Healthy => severity.as_str().green().bold(),
    };
    println!(
        "{} severity {label} (changed: {}, rpc outage: {})",
        "dry run:".cyan().bold(),
        report.classification.state_changed,
        report.classification.rpc_outage
    );

    if report.messages.is_empty() {
        println!("{}", "no messages would be sent".dimmed());
        return;
    }
    for message in &report.messages {
        println!("{}", "─".repeat(40).dimmed());
        println!("{message}");
    }
}
