use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Letters and decimal digits survive; superscripts, fractions and roman numerals do not.
    static ref PUNCT: Regex = Regex::new(r"[^\p{L}\p{Nd}\s]").expect("valid regex");
}

/// Shortest token kept, in characters.
pub const MIN_TOKEN_CHARS: usize = 3;

/// Tokenize text into index terms: lowercase, punctuation to spaces, split on whitespace,
/// drop tokens of two characters or fewer.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = PUNCT.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}
