/*!
 * # fandikana - Betsimisaraka / official Malagasy translation service
 *
 * A Rust library and HTTP service that translates paragraphs between
 * Northern Betsimisaraka Malagasy and official Malagasy with a pretrained
 * sequence-to-sequence model.
 *
 * ## Features
 *
 * - Sentence-level translation of whole paragraphs, keeping punctuation
 *   and line breaks in place
 * - Both directions served side by side, each with its own task prefix
 * - Model hosted by various providers:
 *   - Hugging Face inference endpoints
 *   - Ollama (local server)
 *   - Mock provider for offline runs
 * - JSON configuration file with CLI overrides
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The paragraph pipeline:
 *   - `translation::segmenter`: Delimiter-preserving paragraph splitting
 *   - `translation::reassembler`: Joining sentences and delimiters
 *   - `translation::core`: Sentence translation service and pipeline
 *   - `translation::direction`: Supported language directions
 * - `providers`: Client implementations for model providers:
 *   - `providers::huggingface`: Hugging Face inference client
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Mock provider
 * - `server`: HTTP routes and server lifecycle
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod providers;
pub mod server;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{ProviderError, TranslationError};
pub use server::{AppState, SharedState};
pub use translation::{Direction, TranslationPipeline, TranslationService};
