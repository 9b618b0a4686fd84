//! Vigil Web Server
//!
//! Axum-based REST API wrapping the Vigil rule engine. The server is a
//! thin, stateless boundary: it resolves raw JSON payloads into typed
//! inputs once, invokes the evaluators, and relays selected payloads to a
//! remote prediction backend.
//!
//! Security posture:
//! - Restrictive CORS policy (same-origin unless origins are configured)
//! - Sanitized error responses (internal details only reach the logs)
//! - No authentication and no persistence; both belong to the deployment
//!   perimeter, not this service

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use vigil_core::{BackendClient, BackendError, RuleEngine};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Base URL of the prediction backend; None disables forwarding routes
    pub backend_url: Option<String>,
}

/// Shared application state
pub struct AppState {
    pub engine: RuleEngine,
    pub backend: Option<BackendClient>,
}

/// Success response for simple endpoints
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Create the application router
pub fn create_router(engine: RuleEngine, config: ServerConfig) -> Router {
    let backend = config
        .backend_url
        .as_deref()
        .map(BackendClient::new)
        .or_else(BackendClient::from_env);

    match backend {
        Some(ref client) => {
            info!("Prediction backend configured: {}", client.base_url());
        }
        None => {
            info!(
                "Prediction backend not configured (set {} to enable forwarding routes)",
                vigil_core::backend::BACKEND_URL_ENV
            );
        }
    }

    let state = Arc::new(AppState { engine, backend });

    let routes = Router::new()
        .route("/health", get(health))
        // Local evaluators
        .route(
            "/run/inventory-expiry",
            post(handlers::run_inventory_expiry),
        )
        .route("/run/expiry-alerts", post(handlers::run_expiry_alerts))
        .route("/run/anomalies-local", post(handlers::run_anomalies_local))
        // Validate + summarize + forward
        .route("/run/cashflow", post(handlers::run_cashflow))
        // Pure forwarding
        .route("/run/inventory", post(handlers::run_inventory))
        .route("/run/anomalies", post(handlers::run_anomalies))
        .with_state(state);

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    routes
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(engine: RuleEngine, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(engine, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    engine: RuleEngine,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(engine, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.into(),
            internal: None,
        }
    }

    /// Translate a backend failure, preserving the distinction between
    /// "upstream returned an error" and "upstream unreachable"
    pub fn from_backend(err: BackendError) -> Self {
        match err {
            BackendError::Upstream { status, body } => Self {
                status: StatusCode::from_u16(status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message: body,
                internal: None,
            },
            BackendError::Unreachable(detail) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "Prediction backend unreachable".to_string(),
                internal: Some(anyhow::anyhow!(detail)),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
