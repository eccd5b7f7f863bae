use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::net::SocketAddr;
use std::path::Path;
use url::Url;

use crate::translation::Direction;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Model provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Hugging Face inference endpoint
    #[default]
    HuggingFace,
    // @provider: Ollama
    Ollama,
    // @provider: In-process echo provider for offline runs
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::HuggingFace => "Hugging Face",
            Self::Ollama => "Ollama",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::HuggingFace => "huggingface".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name or repository id
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds, 0 selects the provider's default
    #[serde(default)]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::HuggingFace => Self {
                provider_type: "huggingface".to_string(),
                model: default_huggingface_model(),
                api_key: String::new(),
                endpoint: default_huggingface_endpoint(),
                timeout_secs: default_huggingface_timeout_secs(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::Mock => Self {
                provider_type: "mock".to_string(),
                model: "echo".to_string(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Generation parameters passed to the model for every sentence
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens per sentence
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Beam width used by the decoder
    #[serde(default = "default_num_beams")]
    pub num_beams: u32,

    /// Prompt budget; longer prompts are truncated, never rejected
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            num_beams: default_num_beams(),
            max_input_tokens: default_max_input_tokens(),
        }
    }
}

/// Per-direction settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DirectionConfig {
    /// Task prefix prepended to every sentence before it reaches the model
    pub task_prefix: String,

    /// Model override for this direction; the active provider's model otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl DirectionConfig {
    pub fn for_direction(direction: Direction) -> Self {
        Self {
            task_prefix: direction.default_task_prefix().to_string(),
            model: None,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Generation parameters shared by both directions
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Direction served by the plain `/translate` route
    #[serde(default)]
    pub default_direction: Direction,

    /// Betsimisaraka to official Malagasy
    #[serde(default = "default_bmm_to_mg")]
    pub bmm_to_mg: DirectionConfig,

    /// Official Malagasy to Betsimisaraka
    #[serde(default = "default_mg_to_bmm")]
    pub mg_to_bmm: DirectionConfig,

    /// Probe the provider before accepting requests
    #[serde(default = "default_true")]
    pub startup_check: bool,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8000`
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Maximum accepted request body size
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,

    /// Cross-origin settings
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            body_limit_bytes: default_body_limit_bytes(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration. A `"*"` entry in any list means "any".
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_wildcard")]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_wildcard")]
    pub allow_methods: Vec<String>,
    #[serde(default = "default_wildcard")]
    pub allow_headers: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_origins: default_wildcard(),
            allow_methods: default_wildcard(),
            allow_headers: default_wildcard(),
            allow_credentials: false,
            max_age_secs: default_max_age_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_huggingface_timeout_secs() -> u64 {
    // Cold inference endpoints may need to load the model first
    120
}

fn default_max_new_tokens() -> u32 {
    128
}

fn default_num_beams() -> u32 {
    5
}

fn default_max_input_tokens() -> usize {
    512
}

fn default_true() -> bool {
    true
}

fn default_wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_age_secs() -> u64 {
    600
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

fn default_huggingface_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_huggingface_model() -> String {
    "Amboara001/t5-betsim-mlg-translator".to_string()
}

fn default_ollama_model() -> String {
    "t5-betsim-mlg-translator".to_string()
}

fn default_bmm_to_mg() -> DirectionConfig {
    DirectionConfig::for_direction(Direction::BmmToMg)
}

fn default_mg_to_bmm() -> DirectionConfig {
    DirectionConfig::for_direction(Direction::MgToBmm)
}

impl Config {
    /// Load the configuration file, writing a default one first if it is missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = std::fs::File::open(path)
                .map_err(|e| anyhow!("Failed to open config file {}: {}", path.display(), e))?;
            let reader = std::io::BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
            Ok(config)
        } else {
            log::warn!("Config file not found at '{}', creating default config.", path.display());

            let config = Config::default();
            let config_json = serde_json::to_string_pretty(&config)
                .map_err(|e| anyhow!("Failed to serialize default config to JSON: {}", e))?;
            std::fs::write(path, config_json)
                .map_err(|e| anyhow!("Failed to write default config to {}: {}", path.display(), e))?;

            Ok(config)
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.translation.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    /// Parse the listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        if self.listen_addr.trim().is_empty() {
            return Err(anyhow!("Listen address may not be empty"));
        }
        self.listen_addr
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid listen address '{}': {}", self.listen_addr, e))
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.body_limit_bytes == 0 {
            return Err(anyhow!("Request body limit must be greater than zero"));
        }

        let cors = &self.cors;
        if cors.enabled {
            if cors.allow_origins.is_empty() {
                return Err(anyhow!("CORS is enabled but no origins are allowed"));
            }
            let wildcard = cors.allow_origins.iter().any(|o| o == "*")
                || cors.allow_methods.iter().any(|m| m == "*")
                || cors.allow_headers.iter().any(|h| h == "*");
            if cors.allow_credentials && wildcard {
                return Err(anyhow!("CORS credentials cannot be combined with a '*' wildcard"));
            }
        }

        Ok(())
    }
}

impl TranslationConfig {
    /// Validate the active provider and per-direction settings
    pub fn validate(&self) -> Result<()> {
        if self.generation.max_new_tokens == 0 {
            return Err(anyhow!("max_new_tokens must be greater than zero"));
        }
        if self.generation.num_beams == 0 {
            return Err(anyhow!("num_beams must be greater than zero"));
        }
        if self.generation.max_input_tokens == 0 {
            return Err(anyhow!("max_input_tokens must be greater than zero"));
        }

        for direction in Direction::ALL {
            if self.direction(direction).task_prefix.trim().is_empty() {
                return Err(anyhow!("Task prefix for {} must not be empty", direction));
            }
            let prefix_words = self.direction(direction).task_prefix.split_whitespace().count();
            if self.generation.max_input_tokens <= prefix_words {
                return Err(anyhow!(
                    "max_input_tokens ({}) must exceed the {} word task prefix for {}",
                    self.generation.max_input_tokens,
                    prefix_words,
                    direction
                ));
            }
            if self.model_for(direction).trim().is_empty() {
                return Err(anyhow!("No model configured for {}", direction));
            }
        }

        match self.provider {
            TranslationProvider::HuggingFace | TranslationProvider::Ollama => {
                let endpoint = self.get_endpoint();
                Url::parse(&endpoint).map_err(|e| {
                    anyhow!("Invalid {} endpoint '{}': {}", self.provider.display_name(), endpoint, e)
                })?;
            }
            TranslationProvider::Mock => {}
        }

        Ok(())
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, inserting defaults if absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Settings for one translation direction
    pub fn direction(&self, direction: Direction) -> &DirectionConfig {
        match direction {
            Direction::BmmToMg => &self.bmm_to_mg,
            Direction::MgToBmm => &self.mg_to_bmm,
        }
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::HuggingFace => default_huggingface_model(),
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::Mock => "echo".to_string(),
        }
    }

    /// Model for a direction, honouring the per-direction override
    pub fn model_for(&self, direction: Direction) -> String {
        match &self.direction(direction).model {
            Some(model) if !model.trim().is_empty() => model.clone(),
            _ => self.get_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::HuggingFace => default_huggingface_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::Mock => String::new(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => match self.provider {
                TranslationProvider::HuggingFace => default_huggingface_timeout_secs(),
                TranslationProvider::Ollama | TranslationProvider::Mock => default_timeout_secs(),
            },
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: TranslationProvider::default(),
            available_providers: Vec::new(),
            generation: GenerationConfig::default(),
            default_direction: Direction::default(),
            bmm_to_mg: default_bmm_to_mg(),
            mg_to_bmm: default_mg_to_bmm(),
            startup_check: true,
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(TranslationProvider::HuggingFace));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::Ollama));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::Mock));

        config
    }
}
