/*!
 * Reassembly of segmenter output into a single paragraph.
 */

use super::segmenter::Piece;

/// Join translated sentences and delimiters back into one string.
///
/// Delimiters attach directly to the preceding text (trailing whitespace is
/// dropped first); every sentence gets exactly one leading space. The result
/// is trimmed at both ends. Whitespace runs from the source are not preserved,
/// so a sentence that follows a line break starts with a single space.
///
/// Trimming never removes an emitted delimiter: a `'\n'` delimiter survives
/// both the trim before the next delimiter and the final trim, so every
/// delimiter of the source appears in the output in its original order.
pub fn reassemble(pieces: &[Piece]) -> String {
    let mut result = String::new();
    // End of the last emitted delimiter; trimming stops here
    let mut protected = 0;
    let mut first_delimiter = None;

    for piece in pieces {
        match piece {
            Piece::Delimiter(c) => {
                let kept = result.trim_end().len().max(protected);
                result.truncate(kept);
                first_delimiter.get_or_insert(result.len());
                result.push(*c);
                protected = result.len();
            }
            Piece::Sentence(text) => {
                result.push(' ');
                result.push_str(text);
            }
        }
    }

    let lead_limit = first_delimiter.unwrap_or(result.len());
    let head = &result[..lead_limit];
    let start = head.len() - head.trim_start().len();
    let end = result.trim_end().len().max(protected);

    if start >= end {
        return String::new();
    }
    result[start..end].to_string()
}
