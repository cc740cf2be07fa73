use crate::tokenizer::tokenize;
use crate::DocId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    /// Raw text the tokens were derived from; lets retained corpora skip re-tokenizing.
    pub content: String,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<DocId>, content: impl Into<String>) -> Self {
        let content = content.into();
        let tokens = tokenize(&content);
        Self { id: id.into(), content, tokens }
    }
}

/// Documents keyed by id, iterated in order of first insertion.
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    docs: Vec<Document>,
    positions: HashMap<DocId, usize>,
}

impl Corpus {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn contains(&self, id: &str) -> bool { self.positions.contains_key(id) }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.positions.get(id).map(|&pos| &self.docs[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> { self.docs.iter() }

    /// Store `doc`, returning the entry it replaced. A replaced id keeps its slot.
    pub fn insert(&mut self, doc: Document) -> Option<Document> {
        match self.positions.get(&doc.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.docs[pos], doc)),
            None => {
                self.positions.insert(doc.id.clone(), self.docs.len());
                self.docs.push(doc);
                None
            }
        }
    }

    /// Remove `id`, shifting every later document down one slot. This is O(n), but
    /// `swap_remove` would move the last document into the gap and reorder the ties
    /// that search and clustering break by insertion order.
    pub fn remove(&mut self, id: &str) -> Option<Document> {
        let pos = self.positions.remove(id)?;
        let doc = self.docs.remove(pos);
        for later in &self.docs[pos..] {
            if let Some(p) = self.positions.get_mut(&later.id) {
                *p -= 1;
            }
        }
        Some(doc)
    }
}
