/*!
 * Paragraph segmentation.
 *
 * A paragraph is split on sentence punctuation and line breaks into a token
 * stream that keeps every delimiter as its own element. Text between two
 * delimiters is buffered, trimmed and sent to the translator as one unit;
 * delimiters pass through untouched so the reassembler can restore them.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::core::SentenceTranslator;
use crate::errors::TranslationError;

/// Characters that end a translation unit
pub const DELIMITERS: [char; 5] = ['\n', '.', '!', '?', ';'];

static DELIMITER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n|[.!?;]").expect("delimiter pattern is valid")
});

/// Returns true if `c` is one of the segment delimiters
pub fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

/// One element of the token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text between delimiters, possibly empty or whitespace only
    Fragment(&'a str),
    /// A single delimiter character
    Delimiter(char),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Fragment(text) => f.write_str(text),
            Token::Delimiter(c) => write!(f, "{}", c),
        }
    }
}

/// Split a paragraph into fragments and delimiters.
///
/// The split is lossless: concatenating the tokens in order yields the input.
/// Consecutive delimiters and delimiters at either end produce empty fragments
/// between them.
pub fn tokenize(paragraph: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for found in DELIMITER_REGEX.find_iter(paragraph) {
        tokens.push(Token::Fragment(&paragraph[last..found.start()]));
        if let Some(c) = found.as_str().chars().next() {
            tokens.push(Token::Delimiter(c));
        }
        last = found.end();
    }
    tokens.push(Token::Fragment(&paragraph[last..]));

    tokens
}

/// One element of the segmenter output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Translated text of one buffer
    Sentence(String),
    /// Delimiter copied from the source paragraph
    Delimiter(char),
}

impl Piece {
    /// Classify a raw string: exactly one delimiter character is a delimiter,
    /// anything else is a sentence.
    pub fn classify(text: &str) -> Piece {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if is_delimiter(c) => Piece::Delimiter(c),
            _ => Piece::Sentence(text.to_string()),
        }
    }

    pub fn is_delimiter(&self) -> bool {
        matches!(self, Piece::Delimiter(_))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::Sentence(text) => f.write_str(text),
            Piece::Delimiter(c) => write!(f, "{}", c),
        }
    }
}

/// Accumulates fragments until the next delimiter
#[derive(Debug, Default)]
struct Buffer {
    text: String,
}

impl Buffer {
    fn push(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }

    /// Translate the trimmed buffer if it holds anything, then reset it
    async fn flush(
        &mut self,
        translator: &dyn SentenceTranslator,
        pieces: &mut Vec<Piece>,
    ) -> Result<(), TranslationError> {
        let sentence = self.text.trim();
        if !sentence.is_empty() {
            let translated = translator.translate(sentence).await?;
            pieces.push(Piece::Sentence(translated));
        }
        self.text.clear();
        Ok(())
    }
}

/// Segment a paragraph and translate each unit, strictly in order.
///
/// The first translator error aborts the whole paragraph; no partial output
/// is returned.
pub async fn segment(
    paragraph: &str,
    translator: &dyn SentenceTranslator,
) -> Result<Vec<Piece>, TranslationError> {
    let tokens = tokenize(paragraph);
    let mut pieces = Vec::with_capacity(tokens.len());
    let mut buffer = Buffer::default();

    for token in tokens {
        match token {
            Token::Delimiter(c) => {
                buffer.flush(translator, &mut pieces).await?;
                pieces.push(Piece::Delimiter(c));
            }
            Token::Fragment(text) => buffer.push(text),
        }
    }
    buffer.flush(translator, &mut pieces).await?;

    debug!(
        "Segmented paragraph into {} piece(s), {} sentence(s)",
        pieces.len(),
        pieces.iter().filter(|p| !p.is_delimiter()).count()
    );

    Ok(pieces)
}
