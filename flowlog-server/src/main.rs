// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  flowlog: per-exchange timing CSV for intercepting proxies
//
//  Host:    NDJSON flow replay, reader thread + dispatch workers
//  Hooks:   plugin pipeline, flow-logger built in
//  Config:  YAML file + FLOWLOG_ env overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::Context;
use clap::Parser;
use flowlog_core::config::FlowLogConfig;
use flowlog_plugin::{PluginPipeline, PluginRegistry};
use flowlog_server::replay::{self, ReplayOptions};
use flowlog_server::signal::{self, SHUTDOWN};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "flowlog", version, about = "Append per-exchange timing lines to a CSV file")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "flowlog.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Flows to replay, one JSON object per line ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output CSV, overrides `output.file_path`
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "flowlog starting");

    // ── Config ──
    let mut config = if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
        FlowLogConfig::load(&cli.config)?
    } else {
        info!("No config file found, using defaults");
        FlowLogConfig::default()
    };
    if let Some(output) = cli.output {
        config.output.file_path = output;
    }
    config.validate()?;

    // ── Plugins ──
    let mut registry = PluginRegistry::new();
    flowlog_plugins::register_all(&mut registry);
    let logger = registry
        .instantiate("flow-logger", &serde_json::to_value(&config.output)?)
        .with_context(|| {
            format!("failed to open {}", config.output.file_path.display())
        })?;
    let pipeline = Arc::new(PluginPipeline::build(vec![logger]));
    info!(hooks = ?pipeline.names(), "Hook pipeline ready");

    // ── Input ──
    let input: Box<dyn BufRead + Send> = if cli.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("failed to open input {}", cli.input))?;
        Box::new(BufReader::new(file))
    };

    // ── Graceful shutdown: SIGTERM/SIGINT stop the replay ──
    signal::setup_signal_handler();

    let workers = config.effective_workers();
    info!(workers, input = %cli.input, "Replaying flows");
    let stats = replay::run(
        input,
        Arc::clone(&pipeline),
        ReplayOptions {
            workers,
            queue_capacity: config.replay.queue_capacity,
        },
        &SHUTDOWN,
    );

    if signal::shutdown_requested() {
        info!("Shutdown signal received, stopping...");
    }

    // Flush and close the output file.
    let failed_hooks = pipeline.shutdown();
    if failed_hooks > 0 {
        warn!(failed_hooks, "Some hooks did not shut down cleanly");
    }

    info!(
        lines = stats.lines_read,
        logged = stats.dispatched,
        incomplete = stats.incomplete,
        undecodable = stats.undecodable,
        hook_failures = stats.hook_failures,
        "flowlog stopped"
    );
    Ok(())
}
