use crate::corpus::{Corpus, Document};
use crate::frequency::FrequencyModel;
use crate::vector::{weighted_vector, TermVector};
use crate::DocId;

/// A corpus together with the frequency model derived from it.
///
/// Every mutating method leaves the model refreshed before it returns, so the
/// IDF table read through an `Index` always matches the live corpus.
#[derive(Debug, Default, Clone)]
pub struct Index {
    corpus: Corpus,
    model: FrequencyModel,
}

impl Index {
    pub fn new() -> Self { Self::default() }

    pub fn from_documents<I, S, T>(docs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<DocId>,
        T: Into<String>,
    {
        let mut index = Self::new();
        index.add_documents(docs);
        index
    }

    pub fn add_document(&mut self, id: impl Into<DocId>, text: impl Into<String>) {
        self.stage_upsert(id.into(), text.into());
        self.model.refresh();
    }

    /// Upsert many documents and refresh once. Returns how many were (re)tokenized;
    /// documents whose content is unchanged are left alone.
    pub fn add_documents<I, S, T>(&mut self, docs: I) -> usize
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<DocId>,
        T: Into<String>,
    {
        let mut changed = 0;
        for (id, text) in docs {
            if self.stage_upsert(id.into(), text.into()) {
                changed += 1;
            }
        }
        self.model.refresh();
        changed
    }

    /// Removing an absent id is a no-op.
    pub fn remove_document(&mut self, id: &str) -> bool {
        let removed = self.stage_remove(id);
        self.model.refresh();
        removed
    }

    pub fn remove_documents<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let removed = ids.into_iter().filter(|id| self.stage_remove(id)).count();
        self.model.refresh();
        removed
    }

    /// Apply an upsert to the corpus and df counts without refreshing IDF.
    pub(crate) fn stage_upsert(&mut self, id: DocId, text: String) -> bool {
        if self.corpus.get(&id).map(|d| d.content == text).unwrap_or(false) {
            return false;
        }
        let doc = Document::new(id, text);
        self.model.record(&doc.tokens);
        if let Some(old) = self.corpus.insert(doc) {
            self.model.forget(&old.tokens);
        }
        true
    }

    pub(crate) fn stage_remove(&mut self, id: &str) -> bool {
        match self.corpus.remove(id) {
            Some(old) => {
                self.model.forget(&old.tokens);
                true
            }
            None => false,
        }
    }

    /// Recompute the frequency model from scratch if a mutation was interrupted.
    pub fn repair(&mut self) -> bool {
        if !self.model.is_dirty() { return false; }
        self.model = FrequencyModel::rebuild(&self.corpus);
        true
    }

    pub fn len(&self) -> usize { self.corpus.len() }

    pub fn is_empty(&self) -> bool { self.corpus.is_empty() }

    pub fn contains(&self, id: &str) -> bool { self.corpus.contains(id) }

    pub fn document(&self, id: &str) -> Option<&Document> { self.corpus.get(id) }

    pub fn documents(&self) -> impl Iterator<Item = &Document> { self.corpus.iter() }

    pub fn corpus(&self) -> &Corpus { &self.corpus }

    pub fn model(&self) -> &FrequencyModel { &self.model }

    pub fn idf(&self, term: &str) -> f64 { self.model.idf(term) }

    pub fn weighted_vector(&self, tokens: &[String]) -> TermVector { weighted_vector(tokens, &self.model) }

    /// Weighted vectors for every document, in corpus order.
    pub fn document_vectors(&self) -> Vec<(&Document, TermVector)> {
        self.corpus.iter().map(|d| (d, self.weighted_vector(&d.tokens))).collect()
    }
}
