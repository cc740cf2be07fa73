use crate::corpus::Corpus;
use std::collections::{HashMap, HashSet};

/// Document frequencies and the IDF table derived from them.
///
/// `record`/`forget` adjust document frequencies and mark the table dirty;
/// `refresh` recomputes every IDF weight from the current counts. Callers outside
/// the crate only ever see a model that has been refreshed.
#[derive(Debug, Default, Clone)]
pub struct FrequencyModel {
    df: HashMap<String, u32>,
    idf: HashMap<String, f64>,
    num_docs: usize,
    dirty: bool,
}

impl FrequencyModel {
    pub fn new() -> Self { Self::default() }

    /// Full recomputation from the corpus.
    pub fn rebuild(corpus: &Corpus) -> Self {
        let mut model = Self::new();
        for doc in corpus.iter() {
            model.record(&doc.tokens);
        }
        model.refresh();
        model
    }

    pub(crate) fn record(&mut self, tokens: &[String]) {
        for term in distinct(tokens) {
            *self.df.entry(term.to_string()).or_insert(0) += 1;
        }
        self.num_docs += 1;
        self.dirty = true;
    }

    pub(crate) fn forget(&mut self, tokens: &[String]) {
        for term in distinct(tokens) {
            if let Some(count) = self.df.get_mut(term) {
                *count -= 1;
                if *count == 0 {
                    self.df.remove(term);
                }
            }
        }
        self.num_docs = self.num_docs.saturating_sub(1);
        self.dirty = true;
    }

    pub(crate) fn refresh(&mut self) {
        let n = self.num_docs as f64;
        self.idf = self
            .df
            .iter()
            .map(|(term, &df)| (term.clone(), (n / df as f64).ln()))
            .collect();
        self.dirty = false;
    }

    pub(crate) fn is_dirty(&self) -> bool { self.dirty }

    pub fn document_count(&self) -> usize { self.num_docs }

    pub fn document_frequency(&self, term: &str) -> u32 { self.df.get(term).copied().unwrap_or(0) }

    /// IDF weight of `term`; 0 for terms no document contains.
    pub fn idf(&self, term: &str) -> f64 {
        debug_assert!(!self.dirty, "idf read from a stale model");
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    pub fn idf_table(&self) -> &HashMap<String, f64> { &self.idf }

    pub fn term_count(&self) -> usize { self.df.len() }
}

fn distinct(tokens: &[String]) -> HashSet<&str> {
    tokens.iter().map(String::as_str).collect()
}
