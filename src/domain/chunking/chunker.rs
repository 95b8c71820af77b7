use super::strategy::ChunkingStrategy;
use regex::Regex;
use std::sync::LazyLock;

/// Maximum characters per fragment sent to the TTS provider
pub const CHUNK_MAX_SIZE: usize = 2500;

/// Separator placed between paragraphs merged into one fragment
const PARAGRAPH_SEPARATOR: &str = "\n\n";

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"));

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

/// A piece of the document synthesized as one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub index: usize,
    pub text: String,
}

impl Fragment {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split a document into ordered fragments of at most `CHUNK_MAX_SIZE` characters.
///
/// A single sentence longer than the limit is kept whole as an oversized fragment.
/// The output depends only on `text` and `strategy`, so a restarted run maps every
/// fragment index to the same text.
pub fn chunk(text: &str, strategy: ChunkingStrategy) -> Vec<Fragment> {
    chunk_with_limit(text, strategy, CHUNK_MAX_SIZE)
}

pub fn chunk_with_limit(text: &str, strategy: ChunkingStrategy, max_size: usize) -> Vec<Fragment> {
    let pieces = match strategy {
        ChunkingStrategy::Legacy => chunk_legacy(text, max_size),
        ChunkingStrategy::Smart => chunk_smart(text, max_size),
    };

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Fragment { index, text })
        .collect()
}

fn chunk_legacy(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();

    for paragraph in paragraphs(text) {
        if char_len(paragraph) > max_size {
            pack_sentences(paragraph, max_size, &mut chunks);
        } else {
            chunks.push(paragraph.to_string());
        }
    }

    chunks
}

fn chunk_smart(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in paragraphs(text) {
        let paragraph_len = char_len(paragraph);

        if paragraph_len > max_size {
            flush(&mut chunks, &mut current);
            current_len = 0;
            pack_sentences(paragraph, max_size, &mut chunks);
        } else if current_len + paragraph_len + PARAGRAPH_SEPARATOR.len() < max_size {
            if !current.is_empty() {
                current.push_str(PARAGRAPH_SEPARATOR);
                current_len += PARAGRAPH_SEPARATOR.len();
            }
            current.push_str(paragraph);
            current_len += paragraph_len;
        } else {
            flush(&mut chunks, &mut current);
            current.push_str(paragraph);
            current_len = paragraph_len;
        }
    }

    flush(&mut chunks, &mut current);
    chunks
}

/// Non-blank paragraphs, trimmed, in document order
fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
}

/// Split after `.`, `!` or `?` when followed by whitespace; the whitespace is dropped
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(paragraph) {
        // punctuation is a single ASCII byte
        sentences.push(&paragraph[last_end..mat.start() + 1]);
        last_end = mat.end();
    }

    if last_end < paragraph.len() {
        sentences.push(&paragraph[last_end..]);
    }

    sentences
}

/// Greedily pack sentences into chunks that stay strictly under `max_size`
fn pack_sentences(paragraph: &str, max_size: usize, chunks: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(paragraph) {
        let sentence_len = char_len(sentence);

        if current_len + sentence_len + 1 < max_size {
            current.push_str(sentence);
            current.push(' ');
            current_len += sentence_len + 1;
        } else {
            flush(chunks, &mut current);
            current.push_str(sentence);
            current.push(' ');
            current_len = sentence_len + 1;
        }
    }

    flush(chunks, &mut current);
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
