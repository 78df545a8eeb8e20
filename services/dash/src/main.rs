use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use miette::IntoDiagnostic;
use primavera_dash::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Clone)]
#[command(version, about = "Primavera plant-monitoring dashboard", long_about = None)]
struct Cli {
    #[clap(long, help = "Address to bind the HTTP server to")]
    addr: Option<SocketAddr>,
    #[clap(long, help = "Base URL of the time-series store")]
    store: Option<String>,
    #[clap(
        long,
        value_enum,
        default_value = "info",
        help = "Log level (error, warn, info, debug, trace)"
    )]
    log_level: LogLevel,
    #[clap(long, help = "Path to the configuration file")]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = Cli::parse();
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::builder().from_env_lossy()
    } else {
        EnvFilter::builder().parse_lossy(format!(
            "primavera_dash={level},primavera_data={level},tower_http={level}",
            level = args.log_level.as_str()
        ))
    };
    let _ = tracing_subscriber::fmt::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .try_init();

    let mut config = Config::load(args.config.as_deref()).into_diagnostic()?;
    if let Some(addr) = args.addr {
        config.address = addr;
    }
    if let Some(store) = args.store {
        config.store_url = store;
    }
    info!(addr = %config.address, store = %config.store_url, "starting dashboard");
    primavera_dash::serve(config).await
}
