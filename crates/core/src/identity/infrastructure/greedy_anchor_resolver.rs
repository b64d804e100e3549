/// Greedy anchor resolver: a fast, non-transitive alternative to DBSCAN.
///
/// Each face not yet assigned becomes an anchor and absorbs every later
/// unassigned face whose cosine similarity to the anchor exceeds the
/// threshold. Faces are compared against the anchor only, never against
/// other members, and no face is left as noise.
use crate::identity::domain::identity_resolver::{IdentityLabel, IdentityResolver};
use crate::shared::constants::MATCH_THRESHOLD;
use crate::shared::similarity::cosine_similarity;

pub const DEFAULT_THRESHOLD: f64 = MATCH_THRESHOLD;

pub struct GreedyAnchorResolver {
    threshold: f64,
}

impl GreedyAnchorResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for GreedyAnchorResolver {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl IdentityResolver for GreedyAnchorResolver {
    fn resolve(&self, embeddings: &[&[f32]]) -> Vec<Option<IdentityLabel>> {
        let n = embeddings.len();
        let mut labels: Vec<Option<IdentityLabel>> = vec![None; n];
        let mut next_label: IdentityLabel = 0;

        for anchor in 0..n {
            if labels[anchor].is_some() {
                continue;
            }
            let label = next_label;
            next_label += 1;
            labels[anchor] = Some(label);

            for other in (anchor + 1)..n {
                if labels[other].is_none()
                    && cosine_similarity(embeddings[anchor], embeddings[other]) > self.threshold
                {
                    labels[other] = Some(label);
                }
            }
        }

        labels
    }

    fn name(&self) -> &'static str {
        "greedy_anchor"
    }
}
