//! TF-IDF document indexing, search, pairwise similarity and clustering,
//! plus the request dispatcher that fronts them.

pub mod cluster;
pub mod config;
pub mod corpus;
pub mod dispatch;
pub mod error;
pub mod frequency;
pub mod index;
pub mod protocol;
pub mod search;
pub mod tokenizer;
pub mod vector;

/// Caller-assigned document identifier.
pub type DocId = String;

pub use cluster::{cluster, Cluster};
pub use config::EngineConfig;
pub use corpus::{Corpus, Document};
pub use dispatch::Dispatcher;
pub use error::EngineError;
pub use frequency::FrequencyModel;
pub use index::Index;
pub use protocol::{Operation, Outcome, Reply, Request, Response};
pub use search::{all_pairs_above_threshold, search, similarity, text_similarity, vectorize, DocumentVector, SearchHit, SimilarPair};
pub use vector::{cosine_similarity, TermVector};
