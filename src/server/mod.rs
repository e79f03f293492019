//! HTTP serving layer.

mod envelope;
mod handler;

pub use envelope::{Envelope, RecognizeData, WireBox, WireCandidate};
pub use handler::{AppState, parse_integer};

use crate::config::{ResponseConfig, ServerConfig};
use crate::constants::HEALTH_ENDPOINT;
use crate::error::{Error, Result};
use crate::pipeline::Recognizer;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Build the application router.
pub fn router(recognizer: Arc<Recognizer>, server: &ServerConfig, response: ResponseConfig) -> Router {
    let state = AppState {
        recognizer,
        response: Arc::new(response),
    };

    Router::new()
        .route(&server.endpoint, post(handler::recognize))
        .route(HEALTH_ENDPOINT, get(handler::health))
        .layer(DefaultBodyLimit::max(server.body_limit))
        .with_state(state)
}

/// Bind `host:port` and serve `app` until Ctrl+C or SIGTERM.
pub async fn serve(app: Router, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::ServerBind {
            addr: addr.clone(),
            source: e,
        })?;

    let local = listener.local_addr().map_or(addr, |a| a.to_string());
    info!("Listening on http://{local}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Server)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
