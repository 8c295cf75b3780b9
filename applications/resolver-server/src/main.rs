/// ASMR Resolver Server - yt-dlp backed stream resolution
use asmr_resolver_server::{create_router, AppState, ServerConfig};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "asmr-resolver-server")]
#[command(about = "Stream resolution server for ASMR Player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long, env = "ASMR_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Resolve one video id and print its stream URL
    Resolve {
        /// YouTube video id
        id: String,
        /// Configuration file path
        #[arg(short, long, env = "ASMR_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asmr_resolver_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config).await?;
        }
        Commands::Resolve { id, config } => {
            resolve(&id, config).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<ServerConfig> {
    let config = ServerConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    tracing::info!("Starting ASMR resolver server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!("yt-dlp: {}", config.extractor.ytdlp_path.display());

    let app_state = AppState::from_config(&config)?;
    if app_state.youtube.is_none() {
        tracing::warn!("No YouTube API key; /api/youtube/playlist is disabled");
    }

    let app = create_router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn resolve(id: &str, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let state = AppState::from_config(&config)?;

    let url = state.extractor.stream_url(id).await?;
    println!("{url}");

    Ok(())
}
