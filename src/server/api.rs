//! HTTP API server implementation

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::core::errors::{TranslationError, GENERIC_FAILURE_MESSAGE};
use crate::core::models::TranslationRequest;
use crate::core::resources::ResourceStatus;
use crate::core::service::TranslationService;

/// Largest request body buffered by the translate endpoint
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state
#[derive(Clone)]
pub struct AppState {
    service: Arc<TranslationService>,
}

impl AppState {
    pub fn new(service: TranslationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    resources: ResourceStatus,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A failed request, rendered according to the deployment mode
struct ApiError {
    error: TranslationError,
    development: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = if self.error.is_client_error() {
            ErrorResponse {
                error: self.error.to_string(),
                details: None,
            }
        } else {
            error!("Translation API error: {}", self.error);
            ErrorResponse {
                error: GENERIC_FAILURE_MESSAGE.to_string(),
                details: self.development.then(|| self.error.to_string()),
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        resources: state.service.resources().status(),
    })
}

/// CORS pre-flight handler
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any method other than POST or OPTIONS
async fn method_not_allowed() -> Response {
    ApiError {
        error: TranslationError::MethodNotAllowed,
        development: false,
    }
    .into_response()
}

/// Translation handler
async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            // Over the body limit the text cannot be within the character limit.
            let declared = headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(MAX_BODY_BYTES);
            warn!("Translation request body too large: {} bytes", declared);
            return ApiError {
                error: TranslationError::TextTooLong {
                    max: state.service.config().max_characters,
                    actual: declared,
                },
                development: state.service.config().development,
            }
            .into_response();
        }
        Err(rejection) => {
            warn!("Failed to read translation request body: {}", rejection);
            Bytes::new()
        }
    };

    // Anything that is not an object of string fields counts as missing fields.
    let request: TranslationRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        warn!("Unreadable translation request body: {}", e);
        TranslationRequest::default()
    });

    match state.service.translate(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => ApiError {
            error,
            development: state.service.config().development,
        }
        .into_response(),
    }
}

/// Build the router with CORS headers on every response
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/translate",
            post(translate)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(service: TranslationService, host: String, port: u16) -> anyhow::Result<()> {
    // Load the prompt and knowledge base before accepting traffic
    service.resources().prewarm().await;

    let app = create_router(AppState::new(service));

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
