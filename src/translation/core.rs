/*!
 * Core translation service implementation.
 *
 * This module contains the sentence translation capability, the service that
 * implements it on top of a model provider, and the paragraph pipeline that
 * drives segmentation, per-sentence translation and reassembly.
 */

use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{GenerationConfig, TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::huggingface::{HuggingFace, HuggingFaceRequest};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::Provider;
use super::direction::Direction;
use super::reassembler::reassemble;
use super::segmenter::{segment, Piece};

/// Translates one sentence. Calls may take as long as the model needs.
#[async_trait]
pub trait SentenceTranslator: Send + Sync {
    async fn translate(&self, sentence: &str) -> Result<String, TranslationError>;
}

/// Cut `text` after at most `max_tokens` whitespace-separated words.
///
/// Words stand in for model tokens. Text within the budget is returned as is.
pub fn truncate_to_budget(text: &str, max_tokens: usize) -> &str {
    let mut count = 0;
    let mut in_word = false;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_word = false;
        } else if !in_word {
            if count == max_tokens {
                return text[..idx].trim_end();
            }
            count += 1;
            in_word = true;
        }
    }

    text
}

/// Model provider client variants
#[derive(Debug)]
pub enum ProviderClient {
    /// Hugging Face text2text-generation endpoint
    HuggingFace(HuggingFace),
    /// Ollama server
    Ollama(Ollama),
    /// In-process mock
    Mock(MockProvider),
}

/// Sentence translation backed by a model provider.
///
/// Built once at startup per direction and shared read-only afterwards.
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    client: ProviderClient,

    /// Model name or repository id sent to the provider
    model: String,

    /// Prefix prepended to every sentence
    task_prefix: String,

    /// Generation parameters
    generation: GenerationConfig,
}

impl TranslationService {
    /// Create the translation service for one direction from configuration
    pub fn new(config: &TranslationConfig, direction: Direction) -> Result<Self, TranslationError> {
        let timeout = Duration::from_secs(config.get_timeout_secs());

        let client = match config.provider {
            ConfigTranslationProvider::HuggingFace => {
                let client = HuggingFace::new(
                    config.get_endpoint(),
                    config.model_for(direction),
                    config.get_api_key(),
                    timeout,
                )
                .map_err(|e| TranslationError::Configuration(e.to_string()))?;
                ProviderClient::HuggingFace(client)
            }
            ConfigTranslationProvider::Ollama => {
                let client = Ollama::new(config.get_endpoint(), timeout)
                    .map_err(|e| TranslationError::Configuration(e.to_string()))?;
                ProviderClient::Ollama(client)
            }
            ConfigTranslationProvider::Mock => ProviderClient::Mock(MockProvider::echo()),
        };

        let direction_config = config.direction(direction);

        Ok(Self::from_client(
            client,
            config.model_for(direction),
            direction_config.task_prefix.clone(),
            config.generation.clone(),
        ))
    }

    /// Create a translation service around an already constructed client
    pub fn from_client(
        client: ProviderClient,
        model: impl Into<String>,
        task_prefix: impl Into<String>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            task_prefix: task_prefix.into(),
            generation,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn task_prefix(&self) -> &str {
        &self.task_prefix
    }

    /// Test the connection to the model provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.client {
            ProviderClient::HuggingFace(client) => client.test_connection().await,
            ProviderClient::Ollama(client) => client.test_connection().await,
            ProviderClient::Mock(client) => client.test_connection().await,
        }
    }

    /// Shorten a sentence so that prefix plus sentence fit the input budget
    fn fit_to_budget<'a>(&self, sentence: &'a str) -> &'a str {
        let prefix_tokens = self.task_prefix.split_whitespace().count();
        let budget = self.generation.max_input_tokens.saturating_sub(prefix_tokens);
        let fitted = truncate_to_budget(sentence, budget);
        if fitted.len() < sentence.len() {
            debug!(
                "Truncated sentence from {} to {} bytes to fit {} input tokens",
                sentence.len(),
                fitted.len(),
                self.generation.max_input_tokens
            );
        }
        fitted
    }
}

#[async_trait]
impl SentenceTranslator for TranslationService {
    async fn translate(&self, sentence: &str) -> Result<String, TranslationError> {
        let start_time = Instant::now();
        let text = self.fit_to_budget(sentence);

        let translated = match &self.client {
            ProviderClient::HuggingFace(client) => {
                let request = HuggingFaceRequest::new(format!("{}{}", self.task_prefix, text))
                    .max_new_tokens(self.generation.max_new_tokens)
                    .num_beams(self.generation.num_beams);
                let response = client.complete(request).await?;
                HuggingFace::extract_text(&response)
            }
            ProviderClient::Ollama(client) => {
                let request = GenerationRequest::new(&self.model, format!("{}{}", self.task_prefix, text))
                    .raw()
                    .num_predict(self.generation.max_new_tokens);
                let response = client.complete(request).await?;
                Ollama::extract_text(&response)
            }
            ProviderClient::Mock(client) => {
                let request = MockRequest {
                    task_prefix: self.task_prefix.clone(),
                    text: text.to_string(),
                };
                let response = client.complete(request).await?;
                MockProvider::extract_text(&response)
            }
        };

        debug!("Sentence translated in {:?}", start_time.elapsed());
        Ok(translated.trim().to_string())
    }
}

/// Paragraph pipeline: segment, translate each unit in order, reassemble.
///
/// One instance per direction; the capability handle is shared read-only.
#[derive(Clone)]
pub struct TranslationPipeline {
    direction: Direction,
    translator: Arc<dyn SentenceTranslator>,
}

impl TranslationPipeline {
    pub fn new(direction: Direction, translator: Arc<dyn SentenceTranslator>) -> Self {
        Self { direction, translator }
    }

    /// Build the pipeline for a direction from configuration
    pub fn from_config(config: &TranslationConfig, direction: Direction) -> Result<(Self, Arc<TranslationService>), TranslationError> {
        let service = Arc::new(TranslationService::new(config, direction)?);
        info!(
            "Prepared {} pipeline with model {}",
            direction.display_name(),
            service.model()
        );
        let pipeline = Self::new(direction, service.clone());
        Ok((pipeline, service))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Segment a paragraph and translate every unit
    pub async fn segment(&self, paragraph: &str) -> Result<Vec<Piece>, TranslationError> {
        segment(paragraph, self.translator.as_ref()).await
    }

    /// Translate a whole paragraph
    pub async fn translate_paragraph(&self, paragraph: &str) -> Result<String, TranslationError> {
        let pieces = self.segment(paragraph).await?;
        Ok(reassemble(&pieces))
    }
}

impl std::fmt::Debug for TranslationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationPipeline")
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
