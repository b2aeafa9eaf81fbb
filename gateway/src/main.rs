use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use axum::Router;
use clap::{Parser, Subcommand};
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use anyhow::anyhow;

use voicefall_gateway::{ServerConfig, SynthesisRequest, routes, state::AppState};

/// Voicefall Gateway - text-to-speech server that always answers with audio
#[derive(Parser, Debug)]
#[command(name = "voicefall-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize one text into a WAV file
    Speak {
        /// Text to synthesize
        text: String,

        /// Output WAV path
        #[arg(short = 'o', long = "output", default_value = "speech.wav")]
        output: PathBuf,

        /// Speaker reference file or numeric speaker ID
        #[arg(short = 's', long = "speaker")]
        speaker: Option<String>,

        /// Numeric speaker ID (takes precedence over --speaker)
        #[arg(long = "speaker-id", allow_negative_numbers = true)]
        speaker_id: Option<i64>,

        /// Length scale, >1.0 is slower
        #[arg(short = 'r', long = "rate")]
        rate: Option<f32>,

        /// Language tag for voice cloning
        #[arg(short = 'l', long = "language")]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file or environment
    let config = if let Some(config_path) = cli.config {
        println!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    if let Some(Commands::Speak {
        text,
        output,
        speaker,
        speaker_id,
        rate,
        language,
    }) = cli.command
    {
        let app_state = AppState::new(config);
        let request = SynthesisRequest {
            text,
            language,
            speaker_ref: speaker,
            speaker_id,
            rate_scale: rate,
        };

        let pipeline = app_state.pipeline.clone();
        let outcome = tokio::task::spawn_blocking(move || pipeline.synthesize(&request)).await?;

        std::fs::write(&output, outcome.to_wav_bytes())
            .map_err(|e| anyhow!("Failed to write {}: {}", output.display(), e))?;
        println!(
            "Wrote {} ({:.2}s from {})",
            output.display(),
            outcome.audio.duration_seconds(),
            outcome.source.as_str()
        );
        return Ok(());
    }

    let address = config.address();
    let cors_origins = config.cors_allowed_origins.clone();
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config);

    // Public liveness route
    let public_routes = Router::new().route(
        "/",
        axum::routing::get(voicefall_gateway::handlers::api::health_check),
    );

    // Configure CORS
    let cors_layer = match cors_origins.as_deref() {
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]),
        Some(origins) => {
            // Parse comma-separated origins
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
        }
        None => {
            info!("CORS not configured, defaulting to same-origin only");
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
        }
    };

    let app = public_routes
        .merge(routes::api::create_api_router())
        .with_state(app_state)
        .layer(cors_layer)
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    println!("Server listening on http://{}", socket_addr);

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
