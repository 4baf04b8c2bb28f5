use clap::Parser;
use concursim_api::{AppState, RestApi};
use concursim_similarity::{ClusterStrategy, EngineConfig};
use concursim_storage::{load_store, save_store, RecordStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Clustering, matching and diffing service for extracted form records
#[derive(Parser, Debug)]
#[command(name = "concursim")]
#[command(about = "Similarity engine for extracted form records", long_about = None)]
struct Args {
    /// JSON file with records to preload (snapshot or plain array)
    #[arg(short, long)]
    records: Option<PathBuf>,

    /// Write the store to this file on shutdown
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// HTTP API port
    #[arg(long, default_value_t = 6340)]
    http_port: u16,

    /// Default similarity threshold for clustering
    #[arg(long, default_value_t = 0.6)]
    threshold: f64,

    /// Default clustering strategy (threshold | kmeans)
    #[arg(long, default_value_t = ClusterStrategy::Threshold)]
    strategy: ClusterStrategy,

    /// Default cap on centroid refinement rounds
    #[arg(long, default_value_t = 5)]
    max_iterations: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting concursim v{}", env!("CARGO_PKG_VERSION"));

    let defaults = EngineConfig::new(args.threshold, args.strategy)
        .with_max_iterations(args.max_iterations);
    defaults.validate()?;
    info!(
        "Defaults: threshold {}, strategy {}, max iterations {}",
        defaults.similarity_threshold, defaults.strategy, defaults.max_iterations
    );

    let store = match &args.records {
        Some(path) => load_store(path)?,
        None => RecordStore::new(),
    };
    info!("Store initialized with {} records", store.len());

    let state = Arc::new(AppState::new(store, defaults));

    let state_http = state.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state_http, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    if let Some(path) = &args.snapshot {
        save_store(&state.store, path)?;
    }

    info!("Shutting down...");
    Ok(())
}
