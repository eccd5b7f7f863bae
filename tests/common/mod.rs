/*!
 * Common test utilities for the fandikana test suite
 */

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::net::TcpListener;

use fandikana::app_config::{GenerationConfig, ServerConfig};
use fandikana::errors::{ProviderError, TranslationError};
use fandikana::providers::mock::MockProvider;
use fandikana::server::{self, AppState, SharedState};
use fandikana::translation::core::ProviderClient;
use fandikana::translation::{Direction, SentenceTranslator, TranslationPipeline, TranslationService};

/// Translator that returns every sentence unchanged
#[derive(Debug, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl SentenceTranslator for IdentityTranslator {
    async fn translate(&self, sentence: &str) -> Result<String, TranslationError> {
        Ok(sentence.to_string())
    }
}

/// Translator that records every sentence it receives and can fail on demand
#[derive(Debug, Default)]
pub struct RecordingTranslator {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail when asked to translate exactly `sentence`
    pub fn failing_on(sentence: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(sentence.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SentenceTranslator for RecordingTranslator {
    async fn translate(&self, sentence: &str) -> Result<String, TranslationError> {
        self.calls.lock().unwrap().push(sentence.to_string());
        if self.fail_on.as_deref() == Some(sentence) {
            return Err(TranslationError::Provider(ProviderError::ApiError {
                status_code: 500,
                message: format!("refusing to translate '{}'", sentence),
            }));
        }
        Ok(format!("<{}>", sentence))
    }
}

/// Pipeline for `direction` backed by a mock provider with that direction's task prefix
pub fn mock_pipeline(direction: Direction, provider: MockProvider) -> TranslationPipeline {
    let service = TranslationService::from_client(
        ProviderClient::Mock(provider),
        "echo",
        direction.default_task_prefix(),
        GenerationConfig::default(),
    );
    TranslationPipeline::new(direction, Arc::new(service))
}

/// Shared state whose two pipelines use clones of the same mock provider
pub fn mock_state(provider: MockProvider) -> SharedState {
    Arc::new(AppState::new(
        Direction::BmmToMg,
        mock_pipeline(Direction::BmmToMg, provider.clone()),
        mock_pipeline(Direction::MgToBmm, provider),
    ))
}

/// Full application router with default server settings
pub fn test_router(state: SharedState) -> Router {
    server::build_app_router(&ServerConfig::default(), state).expect("default server config is valid")
}

/// POST request with a raw JSON body
pub fn json_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body and parse it as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve `router` on an ephemeral local port and return its address
pub async fn spawn_fake_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
