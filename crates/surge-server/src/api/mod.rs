//! REST API module
//!
//! Router assembly and the error-to-HTTP mapping. Business rejections of a
//! purchase attempt never pass through [`ApiError`]; they are mapped from
//! `PurchaseOutcome` in the sale handlers. `ApiError` covers validation,
//! store outages (503), and protocol bugs (500).

pub mod sale;

use crate::models::{ErrorResponse, HealthResponse};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router with all routes
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.cors_origin());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/sale", sale::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS layer from the configured origin; unset or unparseable means any
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin {
        Some(raw) => match raw.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!(origin = %raw, "unparseable CORS origin, allowing any");
                layer.allow_origin(Any)
            }
        },
        None => layer.allow_origin(Any),
    }
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// API error type that converts to HTTP responses
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::bad_request(message),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: ErrorResponse::unavailable(message),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.body.code, self.body.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<surge_core::Error> for ApiError {
    fn from(err: surge_core::Error) -> Self {
        use surge_core::Error;

        match err {
            Error::InvalidUserId { reason } => ApiError::bad_request(reason),
            // Transient: callers may re-query user status to learn whether
            // an in-flight purchase committed.
            Error::StoreUnavailable { reason } => ApiError::unavailable(reason),
            // Script/consumer version skew; a bug, not a client problem.
            Error::ScriptProtocol { code } => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ErrorResponse::new(
                    "protocol_violation",
                    format!("unknown status code {} from atomic script", code),
                ),
            },
            Error::WrongType { key } => {
                ApiError::internal(format!("wrong value type at key {}", key))
            }
            Error::InvalidConfiguration { field, reason } => {
                ApiError::internal(format!("invalid configuration {}: {}", field, reason))
            }
            Error::Internal { reason } => ApiError::internal(reason),
            Error::Other(err) => ApiError::internal(err.to_string()),
        }
    }
}
