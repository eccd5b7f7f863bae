use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{error_from_response, Provider};

/// Client for a Hugging Face text2text-generation endpoint serving one model
#[derive(Debug)]
pub struct HuggingFace {
    /// Full URL of the model endpoint
    model_url: Url,
    /// Bearer token, empty for unauthenticated endpoints
    api_key: String,
    /// HTTP client for making requests
    client: Client,
}

/// Inference request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceRequest {
    /// Prompt, task prefix included
    pub inputs: String,
    /// Generation parameters
    pub parameters: GenerationParameters,
    /// Endpoint options
    pub options: InferenceOptions,
}

/// Generation parameters understood by text2text-generation pipelines
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_beams: Option<u32>,
}

/// Endpoint behaviour switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Block until a cold model is loaded instead of answering 503
    pub wait_for_model: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self { wait_for_model: true }
    }
}

/// One generated candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedText {
    /// Decoded output, special tokens removed
    #[serde(alias = "translation_text")]
    pub generated_text: String,
}

/// Inference response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HuggingFaceResponse {
    pub outputs: Vec<GeneratedText>,
}

impl HuggingFaceRequest {
    /// Create a new request for the given prompt
    pub fn new(inputs: impl Into<String>) -> Self {
        Self {
            inputs: inputs.into(),
            parameters: GenerationParameters::default(),
            options: InferenceOptions::default(),
        }
    }

    /// Set the new-token budget
    pub fn max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.parameters.max_new_tokens = Some(max_new_tokens);
        self
    }

    /// Set the beam width
    pub fn num_beams(mut self, num_beams: u32) -> Self {
        self.parameters.num_beams = Some(num_beams);
        self
    }
}

impl HuggingFace {
    /// Create a client for `model` hosted under `endpoint`.
    ///
    /// `endpoint` is either a base such as `https://api-inference.huggingface.co/models`,
    /// to which the model id is appended, or a dedicated endpoint URL when
    /// `model` is already part of its path.
    pub fn new(
        endpoint: impl AsRef<str>,
        model: impl AsRef<str>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let model_url = Self::model_url(endpoint.as_ref(), model.as_ref())?;

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            model_url,
            api_key: api_key.into(),
            client,
        })
    }

    /// Resolve the URL requests are posted to
    fn model_url(endpoint: &str, model: &str) -> Result<Url, ProviderError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        let model = model.trim().trim_matches('/');

        let raw = if model.is_empty() || endpoint.ends_with(model) {
            endpoint.to_string()
        } else {
            format!("{}/{}", endpoint, model)
        };

        Url::parse(&raw)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint URL '{}': {}", raw, e)))
    }

    pub fn url(&self) -> &Url {
        &self.model_url
    }

    fn post(&self, body: &HuggingFaceRequest) -> reqwest::RequestBuilder {
        let builder = self.client.post(self.model_url.clone()).json(body);
        if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl Provider for HuggingFace {
    type Request = HuggingFaceRequest;
    type Response = HuggingFaceResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let response = self.post(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let err = error_from_response(response).await;
            error!("Hugging Face API error ({}): {}", status, err);
            return Err(err);
        }

        let response_text = response.text().await?;
        serde_json::from_str::<HuggingFaceResponse>(&response_text).map_err(|e| {
            let preview: String = response_text.chars().take(500).collect();
            error!("Failed to parse Hugging Face response: {}. Raw response (first 500 chars): {}", e, preview);
            ProviderError::ParseError(e.to_string())
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        debug!("Probing Hugging Face endpoint {}", self.model_url);
        let probe = HuggingFaceRequest::new("ping").max_new_tokens(1).num_beams(1);
        self.complete(probe).await.map(|_| ())
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .outputs
            .first()
            .map(|output| output.generated_text.clone())
            .unwrap_or_default()
    }
}
