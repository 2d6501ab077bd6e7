use axum::{http::HeaderValue, routing::get, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_server::{
    cli::{Cli, Commands},
    config::ServerConfig,
    handlers::{get_config, get_status, health_check},
    ingest::{spawn_udp_sources, spawn_vision_loop},
    state::ServerState,
    vision_backend::backend_from_config,
    ws::{detection_feed, video_feed},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env()?;

    match cli.command {
        Some(Commands::Check) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        Some(Commands::Serve) | None => {}
    }

    info!("🚀 Starting Vigil Server v{}", VERSION);
    info!("📋 Configuration loaded:");
    info!("   Mode: {}", config.mode.as_str());
    info!("   Port: {}", config.port);
    info!("   Bind address: {}", config.bind_addr);
    info!("   Handoff delay: {} ms", config.fusion.handoff_delay_ms);

    let state = Arc::new(ServerState::new(config.clone()));

    // WiFi-derived sources: one UDP listener task each.
    spawn_udp_sources(&state).await;

    // Vision source: fixed-rate polling loop, if a backend comes up. A
    // backend failure disables vision for the process lifetime and the
    // remaining sources keep the system running degraded.
    if config.camera.enabled {
        match backend_from_config(&config.camera) {
            Ok(backend) => spawn_vision_loop(state.clone(), backend),
            Err(e) => {
                warn!("Vision backend init failed: {}", e);
                warn!("Continuing without the vision source");
                state.disable_vision();
            }
        }
    }

    // Build router
    let app = Router::new()
        .route("/ws", get(detection_feed))
        .route("/ws/camera", get(video_feed))
        .route("/health", get(health_check))
        .route("/api/status", get(get_status))
        .route("/api/config", get(get_config))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("🎧 Listening on http://{}", addr);
    info!("📡 Detection feed: ws://{}/ws", addr);
    info!("🎥 Video feed: ws://{}/ws/camera", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
