//! Markdown-aware message chunking.

/// Single-character Markdown markers that must not dangle at the end of
/// a chunk.
pub const TRAILING_MARKERS: [char; 5] = ['*', '_', '~', '`', '['];

/// Split candidates when a single paragraph exceeds the limit.
const SPLIT_WHITESPACE: [char; 2] = [' ', '\n'];

/// Splits `text` into chunks of at most `max_length` characters.
///
/// Paragraphs (newline-delimited) are packed greedily; a paragraph that
/// would overflow the current chunk starts a new one, and the newline is
/// reinserted between paragraphs inside a chunk. A single paragraph
/// longer than the limit is split at the last space or newline at or
/// before `max_length`, or exactly at `max_length` when it contains no
/// whitespace there. Leading whitespace of a continuation is discarded.
///
/// Every chunk is trimmed of trailing unterminated Markdown markers
/// (`* _ ~ \` [`) before it is closed; the trimmed characters are
/// dropped, not carried over. Chunks come back in original text order
/// and are never empty; empty input yields an empty vector.
///
/// # Panics
///
/// Panics if `max_length` is zero.
#[must_use]
pub fn split_message(text: &str, max_length: usize) -> Vec<String> {
    assert!(max_length >= 1, "max_length must be at least 1");

    let mut chunks = Vec::new();

    for packed in pack_paragraphs(text, max_length) {
        if packed.chars().count() <= max_length {
            close_chunk(&mut chunks, &packed);
        } else {
            split_oversized(&packed, max_length, &mut chunks);
        }
    }

    chunks
}

/// Greedily accumulates paragraphs into chunks of roughly `max_length`.
/// Chunks holding a single oversized paragraph may still exceed the
/// limit here; the caller splits those further.
fn pack_paragraphs(text: &str, max_length: usize) -> Vec<String> {
    let mut packed = Vec::new();
    let mut current = String::new();
    let mut current_len = 0_usize;
    let mut has_paragraph = false;

    for paragraph in text.split('\n') {
        let paragraph_len = paragraph.chars().count();

        if !has_paragraph {
            current.push_str(paragraph);
            current_len = paragraph_len;
            has_paragraph = true;
        } else if current_len + paragraph_len + 1 <= max_length {
            current.push('\n');
            current.push_str(paragraph);
            current_len += paragraph_len + 1;
        } else {
            packed.push(std::mem::take(&mut current));
            current.push_str(paragraph);
            current_len = paragraph_len;
        }
    }

    if !current.is_empty() {
        packed.push(current);
    }

    packed
}

/// Splits a chunk longer than `max_length` at whitespace boundaries,
/// falling back to a hard split when no whitespace exists in range.
fn split_oversized(chunk: &str, max_length: usize, out: &mut Vec<String>) {
    let mut rest: Vec<char> = chunk.chars().collect();

    while rest.len() > max_length {
        let split_at = (1..=max_length)
            .rev()
            .find(|&i| SPLIT_WHITESPACE.contains(&rest[i]))
            .unwrap_or(max_length);

        let head: String = rest[..split_at].iter().collect();
        close_chunk(out, head.trim_end());

        let mut start = split_at;
        while start < rest.len() && rest[start].is_whitespace() {
            start += 1;
        }
        rest.drain(..start);
    }

    if !rest.is_empty() {
        let tail: String = rest.iter().collect();
        close_chunk(out, &tail);
    }
}

/// Trims trailing Markdown markers and stores the chunk unless the trim
/// left it empty. Trimmed characters are intentionally dropped.
fn close_chunk(out: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim_end_matches(TRAILING_MARKERS);
    if !trimmed.is_empty() {
        out.push(trimmed.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(split_message("", 4096).is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_message("hello world", 4096), vec!["hello world"]);
    }

    #[test]
    fn test_paragraphs_kept_together_when_they_fit() {
        let text = "first paragraph\nsecond paragraph";
        assert_eq!(split_message(text, 4096), vec![text]);
    }

    #[test]
    fn test_paragraph_boundary_split() {
        // 10 + 1 + 10 > 12, so the second paragraph starts a new chunk.
        let text = "aaaaaaaaaa\nbbbbbbbbbb";
        assert_eq!(split_message(text, 12), vec!["aaaaaaaaaa", "bbbbbbbbbb"]);
    }

    #[test]
    fn test_hard_split_without_whitespace() {
        let text = "A".repeat(5000);
        let chunks = split_message(&text, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 4096);
        assert_eq!(chunks[1].chars().count(), 904);
    }

    #[test]
    fn test_oversized_paragraph_splits_at_whitespace() {
        let word = "word ".repeat(100); // 500 chars
        let chunks = split_message(word.trim_end(), 102);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 102);
            assert!(!chunk.ends_with(' '));
            assert!(!chunk.starts_with(' '));
        }
        let rejoined = chunks.join(" ");
        assert_eq!(rejoined, word.trim_end());
    }

    #[test]
    fn test_no_chunk_ends_with_marker() {
        let text = "some *bold\nmore text _italic\nlink [";
        for chunk in split_message(text, 12) {
            let last = chunk.chars().last().unwrap();
            assert!(
                !TRAILING_MARKERS.contains(&last),
                "chunk ends with marker: {chunk:?}"
            );
        }
    }

    #[test]
    fn test_trailing_markers_are_dropped_not_carried() {
        let text = "abcdefgh**\nnext";
        let chunks = split_message(text, 10);
        assert_eq!(chunks, vec!["abcdefgh", "next"]);
    }

    #[test]
    fn test_marker_only_chunk_is_dropped() {
        let chunks = split_message("***\nabc", 5);
        assert_eq!(chunks, vec!["abc"]);
    }

    #[test]
    fn test_chunks_never_exceed_max_length() {
        let text = "para one two three\n".repeat(50);
        for max in [1, 2, 5, 17, 64] {
            for chunk in split_message(&text, max) {
                assert!(chunk.chars().count() <= max, "max={max} chunk={chunk:?}");
            }
        }
    }

    #[test]
    fn test_deterministic_on_identical_input() {
        let text = "alpha beta gamma\ndelta epsilon\n".repeat(30);
        assert_eq!(split_message(&text, 40), split_message(&text, 40));
    }

    #[test]
    fn test_reading_order_preserved() {
        let text = "one\ntwo\nthree\nfour\nfive";
        let chunks = split_message(text, 9);
        let rejoined = chunks.join("\n");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // Cyrillic characters are two bytes each in UTF-8.
        let text = "ж".repeat(10);
        let chunks = split_message(&text, 6);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 6);
        assert_eq!(chunks[1].chars().count(), 4);
    }

    #[test]
    fn test_blank_lines_between_paragraphs_survive() {
        let text = "first\n\nsecond";
        assert_eq!(split_message(text, 4096), vec![text]);
    }
}
