//! Cost Watcher CLI
//!
//! Host process that feeds spend events into the alert loop.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cost_watcher::alerting::{AlertLoop, LogNotifier, NotificationSink, SlackNotifier};
use cost_watcher::config::LoggingConfig;
use cost_watcher::source::JsonLinesSource;
use cost_watcher::{Config, Error};

/// Exit code for a run stopped by Ctrl+C
const EXIT_CANCELLED: u8 = 130;

/// Cost Watcher - alerts when cloud spend crosses a threshold
#[derive(Parser)]
#[command(name = "cost-watcher")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "COST_WATCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a stream of spend events and post alerts
    Watch {
        /// Newline-delimited JSON events (stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Channel to alert (overrides watcher.channel)
        #[arg(long)]
        channel: Option<String>,

        /// Alert threshold in dollars (overrides watcher.threshold)
        #[arg(long)]
        threshold: Option<f64>,

        /// Log alerts instead of sending them to Slack
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the effective configuration as JSON
    Config,
}

fn main() -> ExitCode {
    // Before parsing so `.env` can supply clap `env` values
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging, cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async move {
        match cli.command {
            Commands::Watch {
                input,
                channel,
                threshold,
                dry_run,
            } => run_watch(config, input.as_deref(), channel, threshold, dry_run).await,
            Commands::Config => run_config(&config),
        }
    });

    // A stdin read parked on a blocking thread cannot be interrupted; don't wait for it.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancelled(&e) => {
            info!("Stopped by user");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Error>().is_some_and(Error::is_cancelled)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load(path)?;
    Ok(config)
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_watch(
    mut config: Config,
    input: Option<&Path>,
    channel: Option<String>,
    threshold: Option<f64>,
    dry_run: bool,
) -> anyhow::Result<()> {
    if let Some(channel) = channel {
        config.watcher.channel = channel;
    }
    if let Some(threshold) = threshold {
        config.watcher.threshold = threshold;
    }
    config.validate()?;

    let watcher = AlertLoop::from_config(&config.watcher);

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
        Some(path) => {
            info!(path = %path.display(), "Reading spend events from file");
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => {
            info!("Reading spend events from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
    };
    let mut source = JsonLinesSource::new(reader);

    let sink: Box<dyn NotificationSink> = if dry_run {
        info!("Dry run: alerts will be logged only");
        Box::new(LogNotifier::new())
    } else if config.slack.webhook_url.is_some() {
        let slack = SlackNotifier::from_config(&config.slack)
            .context("failed to set up Slack notifications")?;
        Box::new(slack)
    } else {
        warn!("slack.webhook_url is not set, alerts will be logged only");
        Box::new(LogNotifier::new())
    };

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down...");
            trigger.cancel();
        }
    });

    watcher.run(&cancel, &mut source, &sink).await?;
    Ok(())
}

fn run_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
