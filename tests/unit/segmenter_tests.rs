/*!
 * Tests for paragraph segmentation
 */

use fandikana::translation::{segment, tokenize, Piece, Token};

use crate::common::{IdentityTranslator, RecordingTranslator};

fn rendered(pieces: &[Piece]) -> Vec<String> {
    pieces.iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_tokenize_consecutiveDelimiters_shouldYieldEmptyFragments() {
    let tokens = tokenize("A..B");
    assert_eq!(
        tokens,
        vec![
            Token::Fragment("A"),
            Token::Delimiter('.'),
            Token::Fragment(""),
            Token::Delimiter('.'),
            Token::Fragment("B"),
        ]
    );
}

#[test]
fn test_tokenize_shouldRecognizeEveryDelimiter() {
    let delimiters: Vec<char> = tokenize("a\nb.c!d?e;f")
        .into_iter()
        .filter_map(|t| match t {
            Token::Delimiter(c) => Some(c),
            Token::Fragment(_) => None,
        })
        .collect();
    assert_eq!(delimiters, vec!['\n', '.', '!', '?', ';']);
}

#[test]
fn test_tokenize_commaAndColon_shouldNotSplit() {
    assert_eq!(tokenize("Salama, tompoko: eny"), vec![Token::Fragment("Salama, tompoko: eny")]);
}

#[tokio::test]
async fn test_segment_withoutDelimiter_shouldYieldSingleSentence() {
    let pieces = segment("Hello world", &IdentityTranslator).await.unwrap();
    assert_eq!(pieces, vec![Piece::Sentence("Hello world".to_string())]);
}

#[tokio::test]
async fn test_segment_shouldKeepDelimitersInSourceOrder() {
    let pieces = segment("Salama! Manao ahoana? Tsara; eny.", &IdentityTranslator).await.unwrap();
    assert_eq!(
        rendered(&pieces),
        vec!["Salama", "!", "Manao ahoana", "?", "Tsara", ";", "eny", "."]
    );
}

#[tokio::test]
async fn test_segment_repeatedDelimiters_shouldNotTranslateEmptyBuffers() {
    let translator = RecordingTranslator::new();
    let pieces = segment("A..B", &translator).await.unwrap();

    assert_eq!(rendered(&pieces), vec!["<A>", ".", ".", "<B>"]);
    assert_eq!(translator.calls(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_segment_shouldTrimBuffersBeforeTranslating() {
    let translator = RecordingTranslator::new();
    segment("  Salama  .\n\t Veloma ", &translator).await.unwrap();

    assert_eq!(translator.calls(), vec!["Salama", "Veloma"]);
}

#[tokio::test]
async fn test_segment_whitespaceOnly_shouldNotCallTranslator() {
    let translator = RecordingTranslator::new();
    let pieces = segment("   \t ", &translator).await.unwrap();

    assert!(pieces.is_empty());
    assert!(translator.calls().is_empty());
}

#[tokio::test]
async fn test_segment_lineBreaks_shouldBeDelimiters() {
    let pieces = segment("Andalana voalohany\nAndalana faharoa", &IdentityTranslator).await.unwrap();
    assert_eq!(
        pieces,
        vec![
            Piece::Sentence("Andalana voalohany".to_string()),
            Piece::Delimiter('\n'),
            Piece::Sentence("Andalana faharoa".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_segment_translatorFailure_shouldAbortAndStopCalling() {
    let translator = RecordingTranslator::failing_on("B");
    let result = segment("A. B. C.", &translator).await;

    assert!(result.is_err());
    assert_eq!(translator.calls(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_segment_sentenceCountMatchesNonEmptyBuffers() {
    let translator = RecordingTranslator::new();
    let pieces = segment("Iray. Roa!\n\nTelo", &translator).await.unwrap();

    let sentences = pieces.iter().filter(|p| !p.is_delimiter()).count();
    let delimiters = pieces.iter().filter(|p| p.is_delimiter()).count();
    assert_eq!(sentences, 3);
    assert_eq!(delimiters, 4);
    assert_eq!(translator.calls().len(), 3);
}
