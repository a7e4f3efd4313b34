//! Lendtree service binary.
//!
//! Wires the model store and the training CSV into the HTTP API. All
//! settings resolve CLI over environment over config file over defaults.

use anyhow::Result;
use clap::Parser;
use config::{Config, File as ConfigFile};
use lendtree_model::ModelStore;
use lendtree_rpc::{start_server, AppState};
use lendtree_trainer::{FEATURE_COLUMNS, TARGET_COLUMN};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "lendtree-node")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Loan-approval decision tree service", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Training CSV path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Model artifact directory
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone)]
struct AppConfig {
    host: String,
    port: u16,
    csv_path: PathBuf,
    model_dir: PathBuf,
    log_level: String,
}

impl AppConfig {
    const DEFAULT_HOST: &'static str = "127.0.0.1";
    const DEFAULT_PORT: u16 = 3000;
    const DEFAULT_CSV: &'static str = "data/loan_applications.csv";
    const DEFAULT_MODEL_DIR: &'static str = "ml_model";
    const DEFAULT_LOG_LEVEL: &'static str = "info";

    fn load(cli: &Cli) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = &cli.config {
            if !path.exists() {
                anyhow::bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }

        builder = builder.add_source(config::Environment::with_prefix("LENDTREE"));

        let config = builder.build()?;

        let host = cli
            .host
            .clone()
            .or_else(|| get_string_value(&config, &["HOST", "server.host"]))
            .unwrap_or_else(|| Self::DEFAULT_HOST.to_string());

        let port = match cli.port {
            Some(port) => port,
            None => match get_string_value(&config, &["PORT", "server.port"]) {
                Some(raw) => raw
                    .parse()
                    .map_err(|err| anyhow::anyhow!("invalid port {raw:?}: {err}"))?,
                None => Self::DEFAULT_PORT,
            },
        };

        let csv_path = cli
            .csv
            .clone()
            .or_else(|| get_string_value(&config, &["CSV_PATH", "data.csv_path"]).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CSV));

        let model_dir = cli
            .model_dir
            .clone()
            .or_else(|| {
                get_string_value(&config, &["MODEL_DIR", "data.model_dir"]).map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_MODEL_DIR));

        let log_level = cli
            .log_level
            .clone()
            .or_else(|| get_string_value(&config, &["LOG_LEVEL", "log.level"]))
            .unwrap_or_else(|| Self::DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            host,
            port,
            csv_path,
            model_dir,
            log_level,
        })
    }

    fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_string_value(config: &Config, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        config
            .get_string(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli)?;

    init_logging(&config);

    info!("🚀 Lendtree node v{}", env!("CARGO_PKG_VERSION"));
    info!("Features: {} (target: {})", FEATURE_COLUMNS.join(", "), TARGET_COLUMN);
    info!("Training CSV: {}", config.csv_path.display());
    info!("Model directory: {}", config.model_dir.display());

    if !config.csv_path.exists() {
        warn!(
            "Training CSV {} does not exist yet; /train will fail until it does",
            config.csv_path.display()
        );
    }

    let store = ModelStore::new(&config.model_dir);
    if store.exists() {
        info!("Found existing model artifacts");
    } else {
        info!("No model artifacts yet; call POST /train to create them");
    }

    let state = AppState::new(config.csv_path.clone(), store);

    let addr = config.bind_addr();
    info!("Listening on http://{addr}");

    start_server(state, &addr).await
}
