/*!
 * Paragraph translation.
 *
 * This module contains the segmentation/translation/reassembly pipeline.
 * It is split into several submodules:
 *
 * - `core`: Sentence translation capability, provider-backed service and the
 *   paragraph pipeline
 * - `segmenter`: Delimiter-preserving paragraph splitting
 * - `reassembler`: Joining translated sentences and delimiters
 * - `direction`: The two language directions served by the API
 */

// Re-export main types for easier usage
pub use self::core::{SentenceTranslator, TranslationPipeline, TranslationService};
pub use self::direction::Direction;
pub use self::reassembler::reassemble;
pub use self::segmenter::{segment, tokenize, Piece, Token, DELIMITERS};

// Submodules
pub mod core;
pub mod direction;
pub mod reassembler;
pub mod segmenter;
