//! Text Segmenter: splits résumé text into section-bounded chunks sized for
//! the model's context window.
//!
//! Algorithm:
//! 1. Collapse every whitespace run (newlines included) to a single space.
//! 2. Split at section-header keywords, keeping each header as its own segment.
//!    Keywords match anywhere, so "Educational" splits after "Education".
//! 3. Greedily pack segments into chunks of at most `max_chunk_words` words.
//!    A single segment larger than the budget still becomes one chunk.

use std::sync::OnceLock;

use regex::Regex;

pub const DEFAULT_MAX_CHUNK_WORDS: usize = 800;

/// Header keyword groups, in match priority order.
const SECTION_PATTERNS: [&str; 6] = [
    "EDUCATION|ACADEMIC|QUALIFICATION",
    "EXPERIENCE|EMPLOYMENT|WORK HISTORY",
    "SKILLS|EXPERTISE|COMPETENCIES",
    "PROJECTS|ACHIEVEMENTS",
    "CERTIFICATIONS|CERTIFICATES",
    "LANGUAGES|INTERESTS",
];

/// A word-count-bounded slice of résumé text sent to the model as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub word_count: usize,
}

fn section_header_regex() -> &'static Regex {
    static HEADERS: OnceLock<Regex> = OnceLock::new();
    HEADERS.get_or_init(|| {
        let pattern = format!(r"(?i)(?:{})", SECTION_PATTERNS.join("|"));
        Regex::new(&pattern).expect("section header pattern is a valid regex")
    })
}

/// Collapses all whitespace runs to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Splits `text` at header keywords, keeping headers as standalone segments
/// interleaved with the bodies between them. Empty segments are dropped.
fn split_keeping_headers(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut last = 0;

    for header in section_header_regex().find_iter(text) {
        segments.push(&text[last..header.start()]);
        segments.push(header.as_str());
        last = header.end();
    }
    segments.push(&text[last..]);

    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Splits résumé text into non-empty chunks of at most `max_chunk_words` words.
pub fn segment(text: &str, max_chunk_words: usize) -> Vec<Chunk> {
    let normalized = normalize_whitespace(text);

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_words = 0;

    for section in split_keeping_headers(&normalized) {
        let section_words = word_count(section);

        if current_words + section_words > max_chunk_words && !current.is_empty() {
            chunks.push(Chunk {
                text: current.join(" "),
                word_count: current_words,
            });
            current.clear();
            current_words = 0;
        }

        current.push(section);
        current_words += section_words;
    }

    if !current.is_empty() {
        chunks.push(Chunk {
            text: current.join(" "),
            word_count: current_words,
        });
    }

    chunks
}
