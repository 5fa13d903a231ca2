use crate::config::Config;
use crate::images::{ImageService, ImageStore, MediaStorage};
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod error;
pub mod openapi;
pub mod routes_images;
pub mod upload_form;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn ImageStore>,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Open the media directory and database named by `config`, creating
    /// both if needed.
    pub fn from_config(config: Config) -> Result<Self> {
        let media_root = &config.storage.media_root;
        std::fs::create_dir_all(media_root)
            .with_context(|| format!("Failed to create media root: {:?}", media_root))?;

        let db_path = &config.storage.database_path;
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let pool = imagehost_db::pool::init_pool(&db_path.to_string_lossy())
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        let service = ImageService::new(MediaStorage::new(media_root.clone()), pool);

        Ok(Self {
            store: Arc::new(service),
            config: Arc::new(config),
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let media_prefix = ctx.config.storage.media_url.trim_end_matches('/').to_string();
    let media_dir = ServeDir::new(&ctx.config.storage.media_root);
    let body_limit = ctx.config.storage.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/", get(|| async { Redirect::temporary("/swagger/") }))
        .merge(routes_images::image_routes())
        // OpenAPI documentation (Swagger UI at /swagger)
        .merge(openapi::openapi_routes())
        .nest_service(&media_prefix, media_dir)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    "ok"
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::from_config(config)?;
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
