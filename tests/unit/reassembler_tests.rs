/*!
 * Tests for reassembling translated pieces
 */

use fandikana::translation::{reassemble, segment, Piece};

use crate::common::IdentityTranslator;

fn sentence(text: &str) -> Piece {
    Piece::Sentence(text.to_string())
}

#[test]
fn test_reassemble_sentenceAfterDelimiter_shouldGetOneSpace() {
    let pieces = vec![sentence("Salama"), Piece::Delimiter('!'), sentence("Manao ahoana"), Piece::Delimiter('?')];
    assert_eq!(reassemble(&pieces), "Salama! Manao ahoana?");
}

#[test]
fn test_reassemble_sentenceWithoutClosingDelimiter_shouldBeKept() {
    let pieces = vec![sentence("Iray"), Piece::Delimiter('.'), sentence("Roa")];
    assert_eq!(reassemble(&pieces), "Iray. Roa");
}

#[test]
fn test_reassemble_lineBreaks_shouldAllSurvive() {
    let pieces = vec![
        sentence("A"),
        Piece::Delimiter('\n'),
        Piece::Delimiter('\n'),
        sentence("B"),
    ];
    assert_eq!(reassemble(&pieces), "A\n\n B");
}

#[test]
fn test_reassemble_trailingLineBreak_shouldBeKept() {
    let pieces = vec![sentence("A"), Piece::Delimiter('.'), Piece::Delimiter('\n')];
    assert_eq!(reassemble(&pieces), "A.\n");
}

#[test]
fn test_reassemble_emptyTranslation_shouldNotLeaveDoubleSpaces() {
    let pieces = vec![sentence("A"), Piece::Delimiter('.'), sentence(""), Piece::Delimiter('.')];
    assert_eq!(reassemble(&pieces), "A..");
}

#[tokio::test]
async fn test_segmentThenReassemble_withIdentity_shouldNormalizeSpacing() {
    let pieces = segment("Salama  .   Veloma  !", &IdentityTranslator).await.unwrap();
    assert_eq!(reassemble(&pieces), "Salama. Veloma!");
}

#[tokio::test]
async fn test_segmentThenReassemble_shouldPreserveDelimiterSequence() {
    let source = "Iray.\nRoa?! Telo;\n";
    let pieces = segment(source, &IdentityTranslator).await.unwrap();
    let output = reassemble(&pieces);

    let delimiters = |s: &str| -> String { s.chars().filter(|c| "\n.!?;".contains(*c)).collect() };
    assert_eq!(delimiters(&output), delimiters(source));
}

#[tokio::test]
async fn test_segmentThenReassemble_repeatedPeriods_shouldRoundTrip() {
    let pieces = segment("A..B", &IdentityTranslator).await.unwrap();
    assert_eq!(reassemble(&pieces), "A.. B");
}

#[tokio::test]
async fn test_segmentThenReassemble_lineBreaks_shouldNotBeTrimmedAway() {
    let doubled = segment("A\n\nB", &IdentityTranslator).await.unwrap();
    assert_eq!(reassemble(&doubled), "A\n\n B");

    let trailing = segment("Salama.\n", &IdentityTranslator).await.unwrap();
    assert_eq!(reassemble(&trailing), "Salama.\n");
}
