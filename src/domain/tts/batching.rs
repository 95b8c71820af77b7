use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+").expect("sentence pattern is valid"));

/// Split text into provider-sized request batches.
///
/// Batches break at sentence boundaries when possible, then at whitespace, and
/// only as a last resort inside a word. `char_len` gives the billed size of each
/// character so callers can account for escaping. Paragraph breaks inside a
/// batch are kept.
pub fn split_into_batches(
    text: &str,
    max_len: usize,
    char_len: impl Fn(char) -> usize,
) -> Vec<String> {
    let measure = |piece: &str| piece.chars().map(&char_len).sum::<usize>();

    if measure(text.trim()) <= max_len {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let mut batches = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences(text) {
        let sentence_len = measure(sentence);

        if current_len + sentence_len > max_len {
            flush(&mut batches, &mut current);
            current_len = 0;
        }

        if sentence_len > max_len {
            split_oversized(sentence, max_len, &char_len, &mut batches);
        } else {
            current.push_str(sentence);
            current_len += sentence_len;
        }
    }

    flush(&mut batches, &mut current);
    batches
}

/// Sentences with their trailing whitespace, covering the whole text
fn sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(text) {
        pieces.push(&text[last_end..mat.end()]);
        last_end = mat.end();
    }
    if last_end < text.len() {
        pieces.push(&text[last_end..]);
    }

    pieces
}

/// Pack words of a sentence that alone exceeds the limit, cutting words that
/// are themselves too long
fn split_oversized(
    sentence: &str,
    max_len: usize,
    char_len: &impl Fn(char) -> usize,
    batches: &mut Vec<String>,
) {
    let mut current = String::new();
    let mut current_len = 0;

    for word in sentence.split_inclusive(char::is_whitespace) {
        for c in word.chars() {
            let len = char_len(c);
            if current_len + len > max_len {
                flush_at_whitespace(batches, &mut current);
                current_len = current.chars().map(char_len).sum();
                if current_len + len > max_len {
                    flush(batches, &mut current);
                    current_len = 0;
                }
            }
            current.push(c);
            current_len += len;
        }
    }

    flush(batches, &mut current);
}

/// Emit `current` up to its last whitespace, keeping the partial word for the
/// next batch. Without whitespace the whole buffer is emitted.
fn flush_at_whitespace(batches: &mut Vec<String>, current: &mut String) {
    match current.rfind(char::is_whitespace) {
        Some(position) if !current[..position].trim().is_empty() => {
            let rest = current[position..].trim_start().to_string();
            current.truncate(position);
            flush(batches, current);
            current.push_str(&rest);
        }
        _ => flush(batches, current),
    }
}

fn flush(batches: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        batches.push(trimmed.to_string());
    }
    current.clear();
}
