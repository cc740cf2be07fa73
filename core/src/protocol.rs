//! Request and response envelopes exchanged with the engine.
//!
//! Requests arrive as `{id, operation, payload}`. The operation name picks an
//! [`Operation`] variant and the payload is decoded into that variant's typed
//! payload, so a shape mismatch is reported as a malformed request and an
//! unrecognised name as an unknown operation. Responses echo the request id and
//! carry exactly one of `result` or `error`.

use crate::cluster::Cluster;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::search::{DocumentVector, SearchHit, SimilarPair};
use crate::DocId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct InputDocument {
    pub id: DocId,
    pub content: String,
}

/// Where an operation's documents come from: the request itself, a retained
/// named corpus, or both (request documents upserted into the named corpus first).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorpusSource {
    #[serde(default)]
    pub documents: Option<Vec<InputDocument>>,
    #[serde(default)]
    pub corpus: Option<String>,
}

impl CorpusSource {
    fn validate(&self) -> Result<()> {
        if self.documents.is_none() && self.corpus.is_none() {
            return Err(EngineError::Malformed("missing field `documents`".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexPayload {
    #[serde(flatten)]
    pub source: CorpusSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPayload {
    #[serde(flatten)]
    pub source: CorpusSource,
    pub query: String,
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityPayload {
    #[serde(flatten)]
    pub source: CorpusSource,
    /// Overrides the configured similarity floor for this call.
    #[serde(default, rename = "minScore")]
    pub min_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterPayload {
    #[serde(flatten)]
    pub source: CorpusSource,
    pub threshold: f64,
}

/// Either two indexed ids or two raw texts.
#[derive(Debug, Clone, Deserialize)]
pub struct ComparePayload {
    #[serde(flatten)]
    pub source: CorpusSource,
    #[serde(default, rename = "idA")]
    pub id_a: Option<DocId>,
    #[serde(default, rename = "idB")]
    pub id_b: Option<DocId>,
    #[serde(default, rename = "textA")]
    pub text_a: Option<String>,
    #[serde(default, rename = "textB")]
    pub text_b: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompareTarget {
    Ids(DocId, DocId),
    Texts(String, String),
}

impl ComparePayload {
    pub fn target(&self) -> Result<CompareTarget> {
        match (&self.id_a, &self.id_b, &self.text_a, &self.text_b) {
            (Some(a), Some(b), None, None) => Ok(CompareTarget::Ids(a.clone(), b.clone())),
            (None, None, Some(a), Some(b)) => Ok(CompareTarget::Texts(a.clone(), b.clone())),
            _ => Err(EngineError::Malformed("`compare` needs either `idA`/`idB` or `textA`/`textB`".into())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorizePayload {
    #[serde(flatten)]
    pub source: CorpusSource,
    /// Indexed documents to report; every document when absent.
    #[serde(default)]
    pub ids: Option<Vec<DocId>>,
    /// Extra texts weighted against the corpus without being indexed.
    #[serde(default)]
    pub texts: Option<Vec<InputDocument>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemovePayload {
    pub corpus: String,
    pub ids: Vec<DocId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropPayload {
    pub corpus: String,
}

#[derive(Debug, Clone)]
pub enum Operation {
    Index(IndexPayload),
    Search(SearchPayload),
    Similarity(SimilarityPayload),
    Cluster(ClusterPayload),
    Compare(ComparePayload),
    Vectorize(VectorizePayload),
    Remove(RemovePayload),
    Drop(DropPayload),
    Clear,
    Stats,
}

impl Operation {
    pub fn decode(name: &str, payload: Value) -> Result<Operation> {
        let op = match name {
            "index" => Operation::Index(payload_of(payload)?),
            "search" => Operation::Search(payload_of(payload)?),
            "similarity" => Operation::Similarity(payload_of(payload)?),
            "cluster" => Operation::Cluster(payload_of(payload)?),
            "compare" => Operation::Compare(payload_of(payload)?),
            "vectorize" => Operation::Vectorize(payload_of(payload)?),
            "remove" => Operation::Remove(payload_of(payload)?),
            "drop" => Operation::Drop(payload_of(payload)?),
            "clear" => Operation::Clear,
            "stats" => Operation::Stats,
            other => return Err(EngineError::UnknownOperation(other.to_string())),
        };
        op.validate()?;
        Ok(op)
    }

    fn validate(&self) -> Result<()> {
        match self {
            Operation::Index(p) => p.source.validate(),
            Operation::Search(p) => {
                p.source.validate()?;
                if p.limit == 0 {
                    return Err(EngineError::Malformed("`limit` must be at least 1".into()));
                }
                Ok(())
            }
            Operation::Similarity(p) => {
                p.source.validate()?;
                match p.min_score {
                    Some(s) if !s.is_finite() => Err(EngineError::Malformed("`minScore` must be finite".into())),
                    _ => Ok(()),
                }
            }
            Operation::Cluster(p) => {
                p.source.validate()?;
                if !(0.0..=1.0).contains(&p.threshold) {
                    return Err(EngineError::Malformed(format!("`threshold` must be within [0, 1], got {}", p.threshold)));
                }
                Ok(())
            }
            Operation::Compare(p) => match p.target()? {
                CompareTarget::Ids(..) => p.source.validate(),
                CompareTarget::Texts(..) => Ok(()),
            },
            Operation::Vectorize(p) => p.source.validate(),
            Operation::Remove(_) | Operation::Drop(_) | Operation::Clear | Operation::Stats => Ok(()),
        }
    }

    /// Reject requests that carry more documents or longer texts than `config` allows.
    pub fn check_limits(&self, config: &EngineConfig) -> Result<()> {
        let max_docs = config.max_documents_per_request;
        let max_chars = config.max_content_chars;
        let docs_ok = |docs: Option<&Vec<InputDocument>>| -> Result<()> {
            let Some(docs) = docs else { return Ok(()) };
            if docs.len() > max_docs {
                return Err(EngineError::Malformed(format!("{} documents exceeds the limit of {max_docs}", docs.len())));
            }
            for d in docs {
                let chars = d.content.chars().count();
                if chars > max_chars {
                    return Err(EngineError::Malformed(format!("content of `{}` is {chars} characters, over the limit of {max_chars}", d.id)));
                }
            }
            Ok(())
        };
        match self {
            Operation::Index(p) => docs_ok(p.source.documents.as_ref()),
            Operation::Search(p) => {
                docs_ok(p.source.documents.as_ref())?;
                text_ok("query", &p.query, max_chars)
            }
            Operation::Similarity(p) => docs_ok(p.source.documents.as_ref()),
            Operation::Cluster(p) => docs_ok(p.source.documents.as_ref()),
            Operation::Compare(p) => {
                docs_ok(p.source.documents.as_ref())?;
                for (name, text) in [("textA", &p.text_a), ("textB", &p.text_b)] {
                    if let Some(text) = text {
                        text_ok(name, text, max_chars)?;
                    }
                }
                Ok(())
            }
            Operation::Vectorize(p) => {
                docs_ok(p.source.documents.as_ref())?;
                docs_ok(p.texts.as_ref())
            }
            Operation::Remove(p) if p.ids.len() > max_docs => {
                Err(EngineError::Malformed(format!("{} ids exceeds the limit of {max_docs}", p.ids.len())))
            }
            Operation::Remove(_) | Operation::Drop(_) | Operation::Clear | Operation::Stats => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Index(_) => "index",
            Operation::Search(_) => "search",
            Operation::Similarity(_) => "similarity",
            Operation::Cluster(_) => "cluster",
            Operation::Compare(_) => "compare",
            Operation::Vectorize(_) => "vectorize",
            Operation::Remove(_) => "remove",
            Operation::Drop(_) => "drop",
            Operation::Clear => "clear",
            Operation::Stats => "stats",
        }
    }
}

fn payload_of<T: DeserializeOwned>(payload: Value) -> Result<T> {
    Ok(serde_json::from_value(payload)?)
}

fn text_ok(what: &str, text: &str, max_chars: usize) -> Result<()> {
    let chars = text.chars().count();
    if chars > max_chars {
        return Err(EngineError::Malformed(format!("{what} is {chars} characters, over the limit of {max_chars}")));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Request {
    pub id: Value,
    pub operation: Operation,
}

/// Read the correlation id of a raw envelope, `null` if it has none.
pub fn request_id(raw: &Value) -> Value {
    raw.get("id").cloned().unwrap_or(Value::Null)
}

impl Request {
    pub fn decode(raw: Value) -> Result<Request> {
        let id = request_id(&raw);
        let Value::Object(mut obj) = raw else {
            return Err(EngineError::Malformed("request must be a JSON object".into()));
        };
        let name = match obj.remove("operation") {
            Some(Value::String(s)) => s,
            Some(_) => return Err(EngineError::Malformed("`operation` must be a string".into())),
            None => return Err(EngineError::Malformed("missing field `operation`".into())),
        };
        let payload = obj.remove("payload").unwrap_or(Value::Null);
        Ok(Request { id, operation: Operation::decode(&name, payload)? })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStats {
    pub corpus: String,
    pub document_count: usize,
    pub term_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub requests_served: u64,
    pub max_retained_corpora: usize,
    pub evicted_corpora: u64,
    pub retained_documents: usize,
    pub corpora: Vec<CorpusStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Indexed {
        #[serde(rename = "indexedCount")]
        indexed_count: usize,
    },
    Hits(Vec<SearchHit>),
    Pairs(Vec<SimilarPair>),
    Clusters(Vec<Cluster>),
    Score { score: f64 },
    Vectors(Vec<DocumentVector>),
    Removed {
        #[serde(rename = "removedCount")]
        removed_count: usize,
    },
    Dropped { dropped: bool },
    Cleared { cleared: usize },
    Stats(EngineStats),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Reply),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    pub fn success(id: Value, reply: Reply) -> Self { Self { id, outcome: Outcome::Result(reply) } }

    pub fn failure(id: Value, err: &EngineError) -> Self { Self { id, outcome: Outcome::Error(err.to_string()) } }

    pub fn is_error(&self) -> bool { matches!(self.outcome, Outcome::Error(_)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_search() {
        let req = Request::decode(json!({
            "id": 7,
            "operation": "search",
            "payload": {"documents": [{"id": "a", "content": "hello world"}], "query": "hello", "limit": 3}
        }))
        .unwrap();
        assert_eq!(req.id, json!(7));
        match req.operation {
            Operation::Search(p) => {
                assert_eq!(p.limit, 3);
                assert_eq!(p.source.documents.map(|d| d.len()), Some(1));
            }
            other => panic!("unexpected {}", other.name()),
        }
    }

    #[test]
    fn unknown_and_malformed_are_distinguished() {
        let err = Request::decode(json!({"id": "x", "operation": "bogus"})).unwrap_err();
        assert!(matches!(err, EngineError::UnknownOperation(ref n) if n == "bogus"));

        let err = Request::decode(json!({"id": "x", "operation": "search", "payload": {"documents": []}})).unwrap_err();
        assert!(matches!(err, EngineError::Malformed(_)));

        let err = Request::decode(json!({"id": "x", "operation": "cluster", "payload": {"documents": [], "threshold": 1.5}})).unwrap_err();
        assert!(matches!(err, EngineError::Malformed(_)));

        let err = Request::decode(json!({"id": "x", "operation": "index", "payload": {}})).unwrap_err();
        assert!(matches!(err, EngineError::Malformed(_)));

        assert!(matches!(Request::decode(json!([1, 2])), Err(EngineError::Malformed(_))));
    }

    #[test]
    fn response_shapes() {
        let ok = serde_json::to_value(Response::success(json!("r1"), Reply::Indexed { indexed_count: 2 })).unwrap();
        assert_eq!(ok, json!({"id": "r1", "result": {"indexedCount": 2}}));

        let err = Response::failure(json!(3), &EngineError::UnknownOperation("bogus".into()));
        assert_eq!(serde_json::to_value(err).unwrap(), json!({"id": 3, "error": "unknown operation: bogus"}));
    }

    #[test]
    fn compare_takes_ids_or_texts_but_not_both() {
        let req = Request::decode(json!({"id": 1, "operation": "compare", "payload": {"textA": "left side", "textB": "right side"}})).unwrap();
        match req.operation {
            Operation::Compare(p) => assert_eq!(p.target().unwrap(), CompareTarget::Texts("left side".into(), "right side".into())),
            other => panic!("unexpected {}", other.name()),
        }

        for payload in [
            json!({"textA": "only one"}),
            json!({"idA": "a", "textB": "mixed"}),
            json!({"idA": "a", "idB": "b"}),
        ] {
            let err = Request::decode(json!({"id": 2, "operation": "compare", "payload": payload})).unwrap_err();
            assert!(matches!(err, EngineError::Malformed(_)));
        }
    }

    #[test]
    fn limits_reject_oversized_requests() {
        let cfg = EngineConfig { max_documents_per_request: 2, max_content_chars: 10, ..Default::default() };
        let decode = |v: Value| Request::decode(v).unwrap().operation;

        let fits = decode(json!({"id": 1, "operation": "index", "payload": {"documents": [{"id": "a", "content": "short"}]}}));
        assert!(fits.check_limits(&cfg).is_ok());

        let too_many = decode(json!({"id": 1, "operation": "index", "payload": {"documents": [
            {"id": "a", "content": "x"}, {"id": "b", "content": "y"}, {"id": "c", "content": "z"}
        ]}}));
        assert!(matches!(too_many.check_limits(&cfg), Err(EngineError::Malformed(_))));

        let too_long = decode(json!({"id": 1, "operation": "search", "payload": {"corpus": "k", "query": "a very long query text", "limit": 1}}));
        assert!(matches!(too_long.check_limits(&cfg), Err(EngineError::Malformed(_))));

        // Ten characters exactly is allowed, counted as chars rather than bytes.
        let boundary = decode(json!({"id": 1, "operation": "compare", "payload": {"textA": "ééééééééé1", "textB": "ok"}}));
        assert!(boundary.check_limits(&cfg).is_ok());
    }
}
