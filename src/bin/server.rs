use anyhow::Context;
use clap::Parser;
use prtimes_aggregator::app::server;
use prtimes_aggregator::utils::{logger, validation::Validate};
use prtimes_aggregator::{Aggregator, PrTimesClient, TomlConfig};

#[derive(Parser)]
#[command(name = "prtimes-server")]
#[command(about = "HTTP endpoint serving PR TIMES releases ranked by likes")]
struct Args {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Override server.port from config
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => TomlConfig::default(),
    };

    if let Some(port) = args.port {
        config.server.port = Some(port);
    }

    logger::init_server_logger(config.json_logs(), config.log_level());

    config.validate().context("Configuration validation failed")?;

    let client = PrTimesClient::from_config(&config)?;
    let aggregator = Aggregator::from_config(client, &config)?;
    let app = server::router(aggregator);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("🚀 Server is running on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
