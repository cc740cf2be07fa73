use crate::index::Index;
use crate::tokenizer::tokenize;
use crate::vector::{cosine_similarity, term_frequencies, TermVector};
use crate::DocId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarPair {
    pub id_a: DocId,
    pub id_b: DocId,
    pub score: f64,
}

/// Sparse TF-IDF weights of one document or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVector {
    pub id: DocId,
    pub weights: TermVector,
}

/// Exact top-k scan. Ordered by descending score; equal scores keep corpus order.
pub fn search(index: &Index, query: &str, top_k: usize, keep_zero_scores: bool) -> Vec<SearchHit> {
    let q_vec = index.weighted_vector(&tokenize(query));
    let mut scored: Vec<SearchHit> = index
        .documents()
        .map(|doc| SearchHit { id: doc.id.clone(), score: cosine_similarity(&q_vec, &index.weighted_vector(&doc.tokens)) })
        .filter(|hit| keep_zero_scores || hit.score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);
    scored
}

/// Cosine similarity of two indexed documents; 0 when either is missing.
pub fn similarity(index: &Index, id_a: &str, id_b: &str) -> f64 {
    match (index.document(id_a), index.document(id_b)) {
        (Some(a), Some(b)) => cosine_similarity(&index.weighted_vector(&a.tokens), &index.weighted_vector(&b.tokens)),
        _ => 0.0,
    }
}

/// Cosine similarity of two raw texts, weighted by the index's IDF table.
/// With nothing indexed there are no IDF weights, so plain term frequencies are compared.
pub fn text_similarity(index: &Index, text_a: &str, text_b: &str) -> f64 {
    let (a, b) = (tokenize(text_a), tokenize(text_b));
    if index.is_empty() {
        return cosine_similarity(&term_frequencies(&a), &term_frequencies(&b));
    }
    cosine_similarity(&index.weighted_vector(&a), &index.weighted_vector(&b))
}

/// Weighted vectors of the requested indexed documents (all of them when `ids` is
/// `None`, unknown ids skipped), followed by `texts` weighted against the same IDF table.
pub fn vectorize(index: &Index, ids: Option<&[DocId]>, texts: &[(DocId, String)]) -> Vec<DocumentVector> {
    let indexed: Vec<DocumentVector> = match ids {
        Some(ids) => ids
            .iter()
            .filter_map(|id| index.document(id))
            .map(|d| DocumentVector { id: d.id.clone(), weights: index.weighted_vector(&d.tokens) })
            .collect(),
        None => index
            .document_vectors()
            .into_iter()
            .map(|(d, weights)| DocumentVector { id: d.id.clone(), weights })
            .collect(),
    };
    let extra = texts
        .iter()
        .map(|(id, text)| DocumentVector { id: id.clone(), weights: index.weighted_vector(&tokenize(text)) });
    indexed.into_iter().chain(extra).collect()
}

/// Every unordered pair scoring strictly above `threshold`, best first.
pub fn all_pairs_above_threshold(index: &Index, threshold: f64) -> Vec<SimilarPair> {
    let vectors = index.document_vectors();
    let mut pairs = Vec::new();
    for (i, (doc_a, vec_a)) in vectors.iter().enumerate() {
        for (doc_b, vec_b) in &vectors[i + 1..] {
            let score = cosine_similarity(vec_a, vec_b);
            if score > threshold {
                pairs.push(SimilarPair { id_a: doc_a.id.clone(), id_b: doc_b.id.clone(), score });
            }
        }
    }
    pairs.sort_by(|a, b| b.score.total_cmp(&a.score));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pets() -> Index {
        Index::from_documents([
            ("A", "the cat sat on the mat"),
            ("B", "the dog sat on the rug"),
            ("C", "quantum entanglement physics"),
        ])
    }

    #[test]
    fn cat_mat_ranks_a_first() {
        let idx = pets();
        let hits = search(&idx, "cat mat", 2, false);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "A");
        assert!(hits[0].score > 0.0);

        let all = search(&idx, "cat mat", 3, true);
        assert_eq!(all.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(all[2].score, 0.0);
    }

    #[test]
    fn empty_query_and_empty_corpus() {
        assert!(search(&pets(), "", 5, false).is_empty());
        assert!(search(&pets(), "?? of", 5, false).is_empty());
        assert!(search(&Index::new(), "cat", 5, true).is_empty());
    }

    #[test]
    fn similarity_missing_id_is_zero() {
        let idx = pets();
        assert_eq!(similarity(&idx, "A", "nope"), 0.0);
        assert!((similarity(&idx, "A", "A") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pairs_are_canonical_and_strict() {
        let idx = Index::from_documents([
            ("x", "solar panel energy"),
            ("y", "solar panel energy"),
            ("z", "baking bread recipe"),
        ]);
        let pairs = all_pairs_above_threshold(&idx, 0.3);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].id_a.as_str(), pairs[0].id_b.as_str()), ("x", "y"));
        assert!(all_pairs_above_threshold(&idx, 1.0).is_empty());
    }

    #[test]
    fn text_similarity_uses_corpus_weights() {
        let idx = pets();
        // "the" and "sat" are common; "cat" is rare, so sharing it counts for more.
        let rare = text_similarity(&idx, "cat sat", "cat ran");
        let common = text_similarity(&idx, "the sat", "the ran");
        assert!(rare > common);
        assert!((text_similarity(&idx, "quantum physics", "physics quantum") - 1.0).abs() < 1e-9);
        assert_eq!(text_similarity(&idx, "unseen words", "unseen words"), 0.0);
    }

    #[test]
    fn text_similarity_without_corpus_compares_term_frequencies() {
        let empty = Index::new();
        assert!((text_similarity(&empty, "red apple pie", "pie apple red") - 1.0).abs() < 1e-9);
        assert!((text_similarity(&empty, "red apple", "red grape") - 0.5).abs() < 1e-9);
        assert_eq!(text_similarity(&empty, "", "red apple"), 0.0);
    }

    #[test]
    fn vectorize_reports_tf_idf_weights() {
        let idx = pets();
        let vectors = vectorize(&idx, Some(&["C".to_string(), "ghost".to_string()][..]), &[("q".to_string(), "quantum cat".to_string())]);
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].id, "C");
        let w = 3f64.ln() / 3.0;
        assert!((vectors[0].weights["physics"] - w).abs() < 1e-12);
        assert_eq!(vectors[1].id, "q");
        assert!((vectors[1].weights["quantum"] - 3f64.ln() / 2.0).abs() < 1e-12);

        let all = vectorize(&idx, None, &[]);
        assert_eq!(all.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }
}
