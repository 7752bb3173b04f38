//! trainstation Server Binary
//!
//! Loads the registry snapshot and starts the TCP server.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use trainstation::config::{Backpressure, MatchMode, ResetPolicy, SnapshotFormat};
use trainstation::registry::RandomAssigner;
use trainstation::storage::open_store;
use trainstation::{Config, Dispatcher, Registry, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// trainstation Server
#[derive(Parser, Debug)]
#[command(name = "trainstation-server")]
#[command(about = "Multi-client TCP train board server")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Registry snapshot file
    #[arg(short, long, default_value = "./trains.xml")]
    data_file: String,

    /// Snapshot encoding
    #[arg(short, long, value_enum, default_value_t = FormatArg::Xml)]
    format: FormatArg,

    /// Append-only REPORT log
    #[arg(short, long, default_value = "./reports.log")]
    report_log: String,

    /// Work queue capacity
    #[arg(short, long, default_value = "50")]
    queue_capacity: usize,

    /// Worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// What to do with requests that arrive while the queue is full
    #[arg(short, long, value_enum, default_value_t = BackpressureArg::Drop)]
    backpressure: BackpressureArg,

    /// Wait budget for `--backpressure block` (milliseconds)
    #[arg(long, default_value = "500")]
    block_timeout_ms: u64,

    /// Match the whole first token instead of a keyword prefix
    #[arg(long)]
    exact_match: bool,

    /// Leave cancelled trains cancelled on RESET
    #[arg(long)]
    keep_cancelled: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Xml,
    Binary,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackpressureArg {
    Drop,
    Reject,
    Block,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,trainstation=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("trainstation Server v{}", trainstation::VERSION);
    tracing::info!("Snapshot file: {}", args.data_file);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .data_file(&args.data_file)
        .snapshot_format(match args.format {
            FormatArg::Xml => SnapshotFormat::Xml,
            FormatArg::Binary => SnapshotFormat::Binary,
        })
        .report_log(&args.report_log)
        .queue_capacity(args.queue_capacity)
        .worker_threads(args.workers)
        .backpressure(match args.backpressure {
            BackpressureArg::Drop => Backpressure::Drop,
            BackpressureArg::Reject => Backpressure::Reject,
            BackpressureArg::Block => Backpressure::Block {
                timeout: Duration::from_millis(args.block_timeout_ms),
            },
        })
        .match_mode(if args.exact_match { MatchMode::Exact } else { MatchMode::Prefix })
        .reset_policy(if args.keep_cancelled {
            ResetPolicy::KeepCancelled
        } else {
            ResetPolicy::Revive
        })
        .build();

    let registry = Arc::new(Registry::from_boxed(
        open_store(config.snapshot_format, &config.data_file),
        Box::new(RandomAssigner::new()),
    ));

    // A missing or unreadable snapshot is not fatal: serve an empty registry
    if let Err(e) = registry.load() {
        tracing::warn!("Could not load {}: {} (starting empty)", config.data_file.display(), e);
    }

    let dispatcher = Arc::new(Dispatcher::from_config(&config, Arc::clone(&registry)));

    let server = match Server::bind(config, dispatcher) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    #[cfg(unix)]
    {
        if let Err(e) = trainstation::network::forward_signals(server.control()) {
            tracing::error!("Failed to install signal handlers: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
