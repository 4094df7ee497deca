//! HTTP service for receipt OCR.
//!
//! Routes:
//! - `POST /extract`: multipart upload (`file` field), returns the OCR result JSON
//! - `GET /health`: `{ "ok": true, "engine": <configured engine> }`

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use rocr_core::{ReceiptPipeline, RocrConfig};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReceiptPipeline>,
}

/// Build the application router.
pub fn router(pipeline: Arc<ReceiptPipeline>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/extract", post(handlers::extract))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pipeline })
}

/// Serve until Ctrl-C.
///
/// The engine setting is not validated here; a bad engine surfaces as a
/// 500 on each extract request.
pub async fn serve(config: RocrConfig) -> std::io::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("bad address: {}", e)))?;

    if rocr_core::select_engine(&config.ocr.engine).is_err() {
        warn!("Engine {:?} is not supported; extract requests will fail", config.ocr.engine);
    }

    let max_upload = config.server.max_upload_bytes;
    let engine = config.ocr.engine.clone();
    let app = router(Arc::new(ReceiptPipeline::new(config)), max_upload);

    let listener = TcpListener::bind(addr).await?;
    info!("Receipt OCR server listening on http://{} (engine: {})", addr, engine);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
