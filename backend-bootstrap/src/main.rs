use anyhow::Result;
use clap::Parser;
use tracing::info;

use backend_infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "checkin-server")]
#[command(about = "Guest check-in server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var("CHECKIN_CONFIG", config);
    }

    let config = AppConfig::load().await?;
    let _log_guard = backend_bootstrap::logging::init_logging(&config.log_format, config.log_dir.as_deref())?;
    info!(bind_addr = %config.bind_addr, data_path = %config.data_path, "configuration loaded");

    backend_bootstrap::run_standalone(config).await
}
