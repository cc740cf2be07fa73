use crate::index::Index;
use crate::vector::cosine_similarity;
use crate::DocId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub cluster_id: usize,
    pub member_ids: Vec<DocId>,
    /// Seed document of the cluster, not a mean vector.
    pub centroid_id: DocId,
}

/// Greedy seed clustering in corpus order.
///
/// Each unassigned document opens a cluster and pulls in every later unassigned
/// document whose similarity to it is at least `threshold`. Members are only
/// guaranteed to be close to the seed, not to each other.
pub fn cluster(index: &Index, threshold: f64) -> Vec<Cluster> {
    let vectors = index.document_vectors();
    let mut assigned = vec![false; vectors.len()];
    let mut clusters = Vec::new();

    for (seed, (seed_doc, seed_vec)) in vectors.iter().enumerate() {
        if assigned[seed] { continue; }
        assigned[seed] = true;
        let mut member_ids = vec![seed_doc.id.clone()];
        for (other, (doc, vec)) in vectors.iter().enumerate().skip(seed + 1) {
            if !assigned[other] && cosine_similarity(seed_vec, vec) >= threshold {
                assigned[other] = true;
                member_ids.push(doc.id.clone());
            }
        }
        clusters.push(Cluster { cluster_id: clusters.len(), member_ids, centroid_id: seed_doc.id.clone() });
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_duplicates_group_together() {
        let idx = Index::from_documents([
            ("d1", "Rust borrow checker rules"),
            ("d2", "rust, BORROW checker rules!"),
            ("other", "chocolate cake frosting"),
            ("d3", "rules checker borrow rust"),
        ]);
        let clusters = cluster(&idx, 0.9);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].centroid_id, "d1");
        assert_eq!(clusters[0].member_ids, vec!["d1", "d2", "d3"]);
        assert_eq!(clusters[1].member_ids, vec!["other"]);
        assert_eq!(clusters[1].cluster_id, 1);
    }

    #[test]
    fn membership_is_seed_relative_not_transitive() {
        // b is close to both a and c, but a and c share nothing.
        let idx = Index::from_documents([
            ("a", "apple apple banana"),
            ("b", "banana cherry"),
            ("c", "cherry cherry durian"),
            ("pad", "unrelated filler words"),
        ]);
        let clusters = cluster(&idx, 0.15);
        assert_eq!(clusters[0].member_ids, vec!["a", "b"]);
        assert!(clusters.iter().any(|c| c.member_ids == vec!["c"]));
    }

    #[test]
    fn zero_threshold_makes_one_cluster() {
        let idx = Index::from_documents([("a", "one thing"), ("b", "another matter")]);
        let clusters = cluster(&idx, 0.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].member_ids.len(), 2);
        assert!(cluster(&Index::new(), 0.5).is_empty());
    }
}
