//! HTTP API: JSON translation routes over the paragraph pipelines.

use std::{any::Any, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
};

use crate::app_config::{CorsConfig, ServerConfig, TranslationConfig};
use crate::errors::TranslationError;
use crate::translation::{Direction, TranslationPipeline};

const TRANSLATE_PATH: &str = "/translate";
const HEALTHZ_PATH: &str = "/healthz";
const HEALTHZ_STATUS: &str = "ok";
const DETAIL_NO_TEXT: &str = "No text provided";
const DETAIL_INTERNAL: &str = "An internal server error occurred.";
const DETAIL_NOT_FOUND: &str = "Not Found";

/// Request body of every translation route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Successful translation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated_text: String,
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error returned to API callers. Carries only a caller-safe detail message.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, DETAIL_INTERNAL)
    }

    fn from_rejection(rejection: &JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, rejection.body_text());
        }
        // A body that is not a JSON object with a string `text` carries no usable text
        Self::bad_request(DETAIL_NO_TEXT)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid listen address `{address}`: {source}")]
    InvalidListenAddr {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("axum server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CORS configuration: {reason}")]
    CorsConfig { reason: String },
}

/// Process-wide, read-only state: one pipeline per direction
#[derive(Debug)]
pub struct AppState {
    default_direction: Direction,
    bmm_to_mg: TranslationPipeline,
    mg_to_bmm: TranslationPipeline,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        default_direction: Direction,
        bmm_to_mg: TranslationPipeline,
        mg_to_bmm: TranslationPipeline,
    ) -> Self {
        debug_assert_eq!(bmm_to_mg.direction(), Direction::BmmToMg);
        debug_assert_eq!(mg_to_bmm.direction(), Direction::MgToBmm);
        Self {
            default_direction,
            bmm_to_mg,
            mg_to_bmm,
        }
    }

    /// Build both pipelines from configuration.
    ///
    /// With `startup_check` enabled each provider is probed once; any failure
    /// is returned so the process can stop before accepting requests.
    pub async fn initialize(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let (bmm_to_mg, bmm_service) = TranslationPipeline::from_config(config, Direction::BmmToMg)?;
        let (mg_to_bmm, mg_service) = TranslationPipeline::from_config(config, Direction::MgToBmm)?;

        if config.startup_check {
            for (direction, service) in [(Direction::BmmToMg, &bmm_service), (Direction::MgToBmm, &mg_service)] {
                info!("Checking {} provider for {}", config.provider.display_name(), direction);
                service.test_connection().await.map_err(|e| {
                    error!("Provider check failed for {}: {}", direction, e);
                    TranslationError::from(e)
                })?;
            }
        } else {
            warn!("Startup provider check disabled; failures will surface on first request");
        }

        Ok(Self::new(config.default_direction, bmm_to_mg, mg_to_bmm))
    }

    pub fn default_direction(&self) -> Direction {
        self.default_direction
    }

    pub fn pipeline(&self, direction: Direction) -> &TranslationPipeline {
        match direction {
            Direction::BmmToMg => &self.bmm_to_mg,
            Direction::MgToBmm => &self.mg_to_bmm,
        }
    }
}

/// Routes only, without CORS, body limit or panic handling
pub fn build_api_router(state: SharedState) -> Router {
    Router::new()
        .route(HEALTHZ_PATH, get(healthz))
        .route(TRANSLATE_PATH, post(translate_default))
        .route(Direction::BmmToMg.route(), post(translate_bmm_to_mg))
        .route(Direction::MgToBmm.route(), post(translate_mg_to_bmm))
        .with_state(state)
}

/// Full application router as served
pub fn build_app_router(config: &ServerConfig, state: SharedState) -> Result<Router, ServerError> {
    let mut router = build_api_router(state)
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes));

    if config.cors.enabled {
        router = router.layer(build_cors_layer(&config.cors)?);
    }

    Ok(router.layer(CatchPanicLayer::custom(handle_panic)))
}

/// Bind and serve until Ctrl-C (or SIGTERM on unix)
pub async fn serve(config: &ServerConfig, state: SharedState) -> Result<(), ServerError> {
    let address: SocketAddr = config.listen_addr.trim().parse().map_err(|source| {
        ServerError::InvalidListenAddr {
            address: config.listen_addr.clone(),
            source,
        }
    })?;

    let app = build_app_router(config, state)?;

    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;
    let local_addr = listener.local_addr().unwrap_or(address);
    info!("Listening on http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServerError::Serve { source })?;

    info!("Server shutdown complete");
    Ok(())
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v.trim() == "*")
}

fn build_cors_layer(config: &CorsConfig) -> Result<CorsLayer, ServerError> {
    let origins = if is_wildcard(&config.allow_origins) {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|err| ServerError::CorsConfig {
                    reason: format!("origin `{origin}` is not a valid header value: {err}"),
                })
            })
            .collect::<Result<_, _>>()?;
        AllowOrigin::list(origins)
    };

    let methods = if is_wildcard(&config.allow_methods) {
        AllowMethods::any()
    } else {
        let methods: Vec<Method> = config
            .allow_methods
            .iter()
            .map(|method| {
                Method::from_bytes(method.as_bytes()).map_err(|_| ServerError::CorsConfig {
                    reason: format!("method `{method}` is invalid"),
                })
            })
            .collect::<Result<_, _>>()?;
        AllowMethods::list(methods)
    };

    let headers = if is_wildcard(&config.allow_headers) {
        AllowHeaders::any()
    } else {
        let headers: Vec<HeaderName> = config
            .allow_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes()).map_err(|err| ServerError::CorsConfig {
                    reason: format!("header `{name}` is invalid: {err}"),
                })
            })
            .collect::<Result<_, _>>()?;
        AllowHeaders::list(headers)
    };

    if config.allow_credentials
        && (is_wildcard(&config.allow_origins)
            || is_wildcard(&config.allow_methods)
            || is_wildcard(&config.allow_headers))
    {
        return Err(ServerError::CorsConfig {
            reason: "credentials cannot be allowed together with a `*` wildcard".to_string(),
        });
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials)
        .max_age(Duration::from_secs(config.max_age_secs)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

async fn healthz() -> impl IntoResponse {
    Json(HealthzResponse {
        status: HEALTHZ_STATUS,
    })
}

async fn translate_default(
    State(state): State<SharedState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let direction = state.default_direction();
    run_translation(state.pipeline(direction), payload).await
}

async fn translate_bmm_to_mg(
    State(state): State<SharedState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, ApiError> {
    run_translation(state.pipeline(Direction::BmmToMg), payload).await
}

async fn translate_mg_to_bmm(
    State(state): State<SharedState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, ApiError> {
    run_translation(state.pipeline(Direction::MgToBmm), payload).await
}

async fn run_translation(
    pipeline: &TranslationPipeline,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::from_rejection(&rejection)
    })?;

    let text = request.text.unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::bad_request(DETAIL_NO_TEXT));
    }

    match pipeline.translate_paragraph(&text).await {
        Ok(translated_text) => {
            debug!(
                "Translated {} chars to {} chars ({})",
                text.chars().count(),
                translated_text.chars().count(),
                pipeline.direction()
            );
            Ok(Json(TranslationResponse { translated_text }))
        }
        Err(e) => {
            error!("An error occurred while translating ({}): {}", pipeline.direction(), e);
            Err(ApiError::internal())
        }
    }
}

async fn not_found_handler(request: Request<Body>) -> Response {
    debug!("No route for {} {}", request.method(), request.uri().path());
    ApiError::new(StatusCode::NOT_FOUND, DETAIL_NOT_FOUND).into_response()
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Request handler panicked: {}", message);
    ApiError::internal().into_response()
}
