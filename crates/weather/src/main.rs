use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use weather::{HostConfig, OpenWeatherMap, WeatherHost, WeatherServer, generate_key};

#[derive(Parser)]
#[command(name = "weather-server")]
#[command(about = "MCP server exposing weather tools over stdio", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve weather tools on stdin/stdout (default)
    Serve,
    /// Generate a new API key for client authentication
    Keygen,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) | None => serve().await,
        Some(Commands::Keygen) => {
            keygen();
            Ok(())
        }
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = HostConfig::from_env()?;

    if config.accepted_keys.is_enabled() {
        info!(keys = config.accepted_keys.len(), "authentication enabled");
        if config.presented_key.is_none() {
            warn!("authentication enabled but the client presented no API key");
        }
    } else {
        info!("authentication disabled (set MCP_SERVER_API_KEYS to enable)");
    }

    let source = OpenWeatherMap::new(&config.weather_api_key).with_base_url(&config.base_url);
    let host = WeatherHost::new(source, config.accepted_keys, config.presented_key);

    info!("starting weather server on stdio");
    let service = WeatherServer::new(host)
        .serve(rmcp::transport::stdio())
        .await?;
    service.waiting().await?;

    info!("weather server stopped");
    Ok(())
}

fn keygen() {
    let key = generate_key();

    println!("Generated API key:\n");
    println!("  {key}\n");
    println!("Server side (enables authentication):");
    println!("  MCP_SERVER_API_KEYS={key}\n");
    println!("Client side (authenticates):");
    println!("  MCP_CLIENT_API_KEY={key}\n");
    println!("Several keys may be listed comma-separated; leave MCP_SERVER_API_KEYS empty to disable auth.");
}
