use serde::{Deserialize, Serialize};

pub const DEFAULT_SIMILARITY_FLOOR: f64 = 0.3;
pub const DEFAULT_MAX_DOCUMENTS: usize = 1000;
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 10_000;
pub const DEFAULT_MAX_RETAINED_CORPORA: usize = 64;

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pairs must score strictly above this to be reported by `similarity`.
    pub similarity_floor: f64,
    /// Keep zero-score documents in search results instead of discarding them.
    pub keep_zero_scores: bool,
    /// Most documents (or texts) a single request may carry.
    pub max_documents_per_request: usize,
    /// Longest content, query or text accepted, in characters.
    pub max_content_chars: usize,
    /// Named corpora kept across requests; the least recently used one is evicted past this.
    pub max_retained_corpora: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_floor: DEFAULT_SIMILARITY_FLOOR,
            keep_zero_scores: false,
            max_documents_per_request: DEFAULT_MAX_DOCUMENTS,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            max_retained_corpora: DEFAULT_MAX_RETAINED_CORPORA,
        }
    }
}
