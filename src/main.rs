//! Synheart Rhythm Agent CLI
//!
//! Sleep schedule and mood inference from post timing.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use synheart_rhythm_agent::{
    baseline::FileBaselineStore,
    classifier::LexiconClassifier,
    config::Config,
    core::{Analyzer, Report, SentimentClassifier},
    ingest::{load_batch, parse_timezone},
    VERSION,
};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "gateway")]
use synheart_rhythm_agent::{BlockingRemoteClassifier, RemoteClassifierConfig};

/// User whose baseline is used when `--user` is omitted.
const DEFAULT_USER: &str = "default";

#[derive(Parser)]
#[command(name = "synheart-rhythm")]
#[command(author = "Synheart")]
#[command(version = VERSION)]
#[command(about = "Sleep schedule and mood inference from post timing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a batch of posts and update the user's baseline
    Analyze {
        /// Post dump (JSON array or JSON Lines)
        #[arg(long, short)]
        input: PathBuf,

        /// User whose baseline is compared and updated
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,

        /// IANA timezone for posts without an offset
        #[arg(long)]
        timezone: Option<String>,

        /// Number of posts to classify
        #[arg(long)]
        max_tweets: Option<usize>,

        /// Write the report here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Classifier service port (requires gateway feature)
        #[arg(long)]
        classifier_port: Option<u16>,

        /// Classifier service token (requires gateway feature)
        #[arg(long)]
        classifier_token: Option<String>,
    },

    /// Show a user's baseline
    Baseline {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },

    /// Reset a user's baseline
    Reset {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },

    /// Run the HTTP server (requires server feature)
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            user,
            timezone,
            max_tweets,
            output,
            classifier_port,
            classifier_token,
        } => cmd_analyze(
            &input,
            &user,
            timezone.as_deref(),
            max_tweets,
            output,
            classifier_port,
            classifier_token,
        ),
        Commands::Baseline { user } => cmd_baseline(&user),
        Commands::Reset { user } => cmd_reset(&user),
        Commands::Serve { port } => cmd_serve(port),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_analyze(
    input: &Path,
    user: &str,
    timezone: Option<&str>,
    max_tweets: Option<usize>,
    output: Option<PathBuf>,
    classifier_port: Option<u16>,
    classifier_token: Option<String>,
) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    let timezone = match timezone {
        Some(name) => Some(parse_timezone(name)?),
        None => config.timezone()?,
    };

    let batch = load_batch(input, timezone)
        .with_context(|| format!("Failed to load posts from {input:?}"))?;
    if batch.skipped > 0 {
        eprintln!("Warning: skipped {} post(s) with unreadable timestamps", batch.skipped);
    }

    let classifier = create_classifier(classifier_port, classifier_token)?;
    let analyzer = Analyzer::new(classifier, max_tweets.unwrap_or(config.max_tweets));

    let mut store = FileBaselineStore::open(config.baseline_path(user)?)?;
    let report = analyzer.analyze(&batch.events, &mut store)?;

    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write report to {path:?}"))?;
            print_summary(&report);
            println!();
            println!("Report written to {path:?}");
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn print_summary(report: &Report) {
    println!("Synheart Rhythm Report");
    println!("======================");
    println!();
    println!("  Wake up:     {}", report.wake_up_time_str);
    println!("  Bed time:    {}", report.bed_time_str);
    println!("  Slept:       {}", report.hours_slept);
    println!("  Fit:         {}%", report.sleep_coefficient);
    println!(
        "  Rest:        {}% {} baseline",
        report.rest_percentage,
        if report.well_rested { "above" } else { "below" }
    );
    println!(
        "  Sentiment:   {} posts, {}% positive vs baseline, {}% negative vs baseline",
        report.sentiment.num_tweets, report.sentiment.pos_relative_str, report.sentiment.neg_relative_str
    );
}

fn cmd_baseline(user: &str) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();
    let path = config.baseline_path(user)?;

    if !path.exists() {
        println!("No baseline recorded for '{user}' yet.");
        println!("Run 'synheart-rhythm analyze --user {user}' to start one.");
        return Ok(());
    }

    let store = FileBaselineStore::open(path)?;
    println!("User: {user}");
    println!("File: {}", store.path().display());
    println!();
    println!("{}", store.snapshot().summary());
    Ok(())
}

fn cmd_reset(user: &str) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();
    let mut store = FileBaselineStore::open(config.baseline_path(user)?)?;
    store.reset()?;
    println!("Baseline for '{user}' reset ({}).", store.path().display());
    Ok(())
}

#[cfg(feature = "server")]
fn cmd_serve(port: Option<u16>) -> anyhow::Result<()> {
    use synheart_rhythm_agent::server::{run, ServerConfig};

    let config = Config::load().unwrap_or_default();
    config.ensure_directories()?;

    let mut server_config =
        ServerConfig::new(port.unwrap_or(config.server_port), config.baseline_dir());
    server_config.max_tweets = config.max_tweets;
    server_config.default_timezone = config.timezone()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (addr, shutdown_tx) = run(server_config).await?;
        println!("Synheart Rhythm Agent v{VERSION} listening on http://{addr}");
        println!("Press Ctrl+C to stop.");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        Ok::<(), anyhow::Error>(())
    })
}

#[cfg(not(feature = "server"))]
fn cmd_serve(_port: Option<u16>) -> anyhow::Result<()> {
    anyhow::bail!("server support not compiled in; rebuild with --features server")
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Create the remote classifier when a port is given, otherwise the lexicon.
#[cfg(feature = "gateway")]
fn create_classifier(
    port: Option<u16>,
    token: Option<String>,
) -> anyhow::Result<Box<dyn SentimentClassifier>> {
    match port {
        Some(port) => {
            let config = RemoteClassifierConfig::local(port, token.unwrap_or_default());
            let classifier = BlockingRemoteClassifier::new(config)?;
            if !classifier.test_connection().unwrap_or(false) {
                eprintln!("Warning: classifier service on port {port} did not pass its health check");
            }
            Ok(Box::new(classifier))
        }
        None => Ok(Box::new(LexiconClassifier::new())),
    }
}

#[cfg(not(feature = "gateway"))]
fn create_classifier(
    port: Option<u16>,
    _token: Option<String>,
) -> anyhow::Result<Box<dyn SentimentClassifier>> {
    if port.is_some() {
        eprintln!("Warning: --classifier-port requires the gateway feature; using built-in classifier");
    }
    Ok(Box::new(LexiconClassifier::new()))
}
