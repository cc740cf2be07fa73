use crate::cluster::cluster;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::index::Index;
use crate::protocol::{CompareTarget, CorpusSource, CorpusStats, EngineStats, Operation, Reply, Request, Response, request_id};
use crate::search::{all_pairs_above_threshold, search, similarity, text_similarity, vectorize};
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

struct Retained {
    index: Index,
    last_used: u64,
}

/// Turns request envelopes into response envelopes. Never panics and never
/// returns without a response; one bad request leaves later ones unaffected.
pub struct Dispatcher {
    config: EngineConfig,
    corpora: HashMap<String, Retained>,
    served: u64,
    evicted: u64,
}

impl Dispatcher {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, corpora: HashMap::new(), served: 0, evicted: 0 }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn dispatch(&mut self, raw: Value) -> Response {
        self.served += 1;
        let id = request_id(&raw);
        let result = Request::decode(raw).and_then(|req| {
            req.operation.check_limits(&self.config)?;
            tracing::debug!(op = req.operation.name(), id = %req.id, "dispatching request");
            self.guarded(|d| d.execute(req.operation))
        });
        respond(id, result)
    }

    /// Run `f`, turning a panic into a computation error and rebuilding any
    /// retained frequency model it left half-updated.
    fn guarded<F>(&mut self, f: F) -> Result<Reply>
    where
        F: FnOnce(&mut Self) -> Result<Reply>,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(result) => result,
            Err(cause) => {
                for (name, retained) in self.corpora.iter_mut() {
                    if retained.index.repair() {
                        tracing::warn!(corpus = %name, "rebuilt frequency model after fault");
                    }
                }
                Err(EngineError::Computation(panic_message(cause.as_ref())))
            }
        }
    }

    fn execute(&mut self, op: Operation) -> Result<Reply> {
        let keep_zero = self.config.keep_zero_scores;
        let reply = match op {
            Operation::Index(p) => {
                let indexed_count = self.with_index(p.source, |idx| idx.len());
                Reply::Indexed { indexed_count }
            }
            Operation::Search(p) => {
                let (query, limit) = (p.query, p.limit);
                Reply::Hits(self.with_index(p.source, |idx| search(idx, &query, limit, keep_zero)))
            }
            Operation::Similarity(p) => {
                let floor = p.min_score.unwrap_or(self.config.similarity_floor);
                Reply::Pairs(self.with_index(p.source, |idx| all_pairs_above_threshold(idx, floor)))
            }
            Operation::Cluster(p) => {
                let threshold = p.threshold;
                Reply::Clusters(self.with_index(p.source, |idx| cluster(idx, threshold)))
            }
            Operation::Compare(p) => {
                let score = match p.target()? {
                    CompareTarget::Ids(a, b) => self.with_index(p.source, |idx| similarity(idx, &a, &b)),
                    CompareTarget::Texts(a, b) => self.with_index(p.source, |idx| text_similarity(idx, &a, &b)),
                };
                Reply::Score { score }
            }
            Operation::Vectorize(p) => {
                let texts: Vec<(String, String)> = p.texts.unwrap_or_default().into_iter().map(|t| (t.id, t.content)).collect();
                let ids = p.ids;
                Reply::Vectors(self.with_index(p.source, |idx| vectorize(idx, ids.as_deref(), &texts)))
            }
            Operation::Remove(p) => {
                let removed_count = match self.touch(&p.corpus) {
                    Some(idx) => idx.remove_documents(p.ids.iter().map(String::as_str)),
                    None => 0,
                };
                Reply::Removed { removed_count }
            }
            Operation::Drop(p) => Reply::Dropped { dropped: self.corpora.remove(&p.corpus).is_some() },
            Operation::Clear => {
                let cleared = self.corpora.len();
                self.corpora.clear();
                tracing::info!(cleared, "cleared retained corpora");
                Reply::Cleared { cleared }
            }
            Operation::Stats => Reply::Stats(self.stats()),
        };
        Ok(reply)
    }

    /// Run `f` against the index the request refers to. Without a corpus name the
    /// request's documents form a throwaway index; with one, they are upserted into
    /// the retained corpus first.
    fn with_index<R>(&mut self, source: CorpusSource, f: impl FnOnce(&Index) -> R) -> R {
        let docs = source.documents.map(|docs| docs.into_iter().map(|d| (d.id, d.content)));
        match (source.corpus, docs) {
            (None, docs) => f(&Index::from_documents(docs.into_iter().flatten())),
            (Some(name), Some(docs)) => {
                let idx = self.retain(name);
                let changed = idx.add_documents(docs);
                tracing::debug!(changed, total = idx.len(), "upserted into retained corpus");
                f(idx)
            }
            (Some(name), None) => match self.touch(&name) {
                Some(idx) => f(idx),
                None => f(&Index::new()),
            },
        }
    }

    /// Mark a retained corpus as used and hand it out.
    fn touch(&mut self, name: &str) -> Option<&mut Index> {
        let tick = self.served;
        self.corpora.get_mut(name).map(|r| {
            r.last_used = tick;
            &mut r.index
        })
    }

    /// Get or create a retained corpus, evicting the least recently used ones to
    /// stay within `max_retained_corpora`.
    fn retain(&mut self, name: String) -> &mut Index {
        if !self.corpora.contains_key(&name) {
            let cap = self.config.max_retained_corpora.max(1);
            while self.corpora.len() >= cap {
                let Some(oldest) = self.corpora.iter().min_by_key(|(_, r)| r.last_used).map(|(n, _)| n.clone()) else { break };
                if let Some(evicted) = self.corpora.remove(&oldest) {
                    self.evicted += 1;
                    tracing::info!(corpus = %oldest, documents = evicted.index.len(), "evicted least recently used corpus");
                }
            }
        }
        let tick = self.served;
        let retained = self.corpora.entry(name).or_insert_with(|| Retained { index: Index::new(), last_used: tick });
        retained.last_used = tick;
        &mut retained.index
    }

    pub fn stats(&self) -> EngineStats {
        let mut corpora: Vec<CorpusStats> = self
            .corpora
            .iter()
            .map(|(name, r)| CorpusStats { corpus: name.clone(), document_count: r.index.len(), term_count: r.index.model().term_count() })
            .collect();
        corpora.sort_by(|a, b| a.corpus.cmp(&b.corpus));
        EngineStats {
            requests_served: self.served,
            max_retained_corpora: self.config.max_retained_corpora,
            evicted_corpora: self.evicted,
            retained_documents: corpora.iter().map(|c| c.document_count).sum(),
            corpora,
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self { Self::new(EngineConfig::default()) }
}

fn respond(id: Value, result: Result<Reply>) -> Response {
    match result {
        Ok(reply) => Response::success(id, reply),
        Err(err) => {
            tracing::warn!(id = %id, error = %err, "request failed");
            Response::failure(id, &err)
        }
    }
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal panic".to_string()
    }
}
