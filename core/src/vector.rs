use crate::frequency::FrequencyModel;
use std::collections::BTreeMap;

/// Sparse term → weight mapping over terms actually present. Ordered so that
/// sums over it are reproducible bit for bit.
pub type TermVector = BTreeMap<String, f64>;

/// Term frequency: occurrences / total tokens.
pub fn term_frequencies(tokens: &[String]) -> TermVector {
    let mut tf = TermVector::new();
    if tokens.is_empty() { return tf; }
    for t in tokens {
        *tf.entry(t.clone()).or_insert(0.0) += 1.0;
    }
    let len = tokens.len() as f64;
    for w in tf.values_mut() { *w /= len; }
    tf
}

/// TF scaled by the model's current IDF weights. Terms the model has never seen weigh 0.
pub fn weighted_vector(tokens: &[String], model: &FrequencyModel) -> TermVector {
    let mut v = term_frequencies(tokens);
    for (term, w) in v.iter_mut() {
        *w *= model.idf(term);
    }
    v
}

/// Cosine of the angle between two non-negative sparse vectors, in [0, 1].
/// Returns 0 when either vector has zero norm.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    for (term, wa) in a {
        norm_a += wa * wa;
        if let Some(wb) = b.get(term) {
            dot += wa * wb;
        }
    }
    let norm_b: f64 = b.values().map(|w| w * w).sum();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(pairs: &[(&str, f64)]) -> TermVector {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn tf_is_fraction_of_tokens() {
        let toks: Vec<String> = ["red", "red", "blue", "green"].iter().map(|s| s.to_string()).collect();
        let tf = term_frequencies(&toks);
        assert_eq!(tf["red"], 0.5);
        assert_eq!(tf["blue"], 0.25);
        assert!(term_frequencies(&[]).is_empty());
    }

    #[test]
    fn cosine_handles_disjoint_and_zero_vectors() {
        let a = vec_of(&[("x", 1.0), ("y", 2.0)]);
        let b = vec_of(&[("z", 3.0)]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&a, &TermVector::new()), 0.0);
        assert_eq!(cosine_similarity(&vec_of(&[("x", 0.0)]), &a), 0.0);
    }

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        let a = vec_of(&[("x", 1.0), ("y", 2.0)]);
        let b = vec_of(&[("x", 2.0), ("y", 4.0)]);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&a, &a) <= 1.0);
    }

    #[test]
    fn cosine_partial_overlap() {
        let a = vec_of(&[("x", 1.0), ("y", 1.0)]);
        let b = vec_of(&[("x", 1.0)]);
        assert!((cosine_similarity(&a, &b) - 1.0 / 2f64.sqrt()).abs() < 1e-12);
    }
}
