/// Density-based identity resolver over cosine distance.
///
/// A face whose epsilon-neighbourhood (itself included) holds at least
/// `min_samples` faces seeds or extends an identity; faces reachable from
/// such a face but not dense themselves join as border members. Anything
/// else is noise. A border face within reach of two identities joins the
/// one that is expanded first, so labels depend on input order at
/// identity boundaries.
use std::collections::VecDeque;

use crate::identity::domain::identity_resolver::{IdentityLabel, IdentityResolver};
use crate::shared::constants::{IDENTITY_EPSILON, MIN_IDENTITY_SIZE};
use crate::shared::similarity::cosine_distance;

pub const DEFAULT_EPSILON: f64 = IDENTITY_EPSILON;
pub const DEFAULT_MIN_SAMPLES: usize = MIN_IDENTITY_SIZE;

pub struct DbscanIdentityResolver {
    epsilon: f64,
    min_samples: usize,
}

impl DbscanIdentityResolver {
    pub fn new(epsilon: f64, min_samples: usize) -> Self {
        Self {
            epsilon,
            min_samples: min_samples.max(1),
        }
    }

    /// Neighbour lists for every face, self included, in index order.
    fn neighbourhoods(&self, embeddings: &[&[f32]]) -> Vec<Vec<usize>> {
        let n = embeddings.len();
        let mut neighbours: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        for i in 0..n {
            for j in (i + 1)..n {
                if cosine_distance(embeddings[i], embeddings[j]) < self.epsilon {
                    neighbours[i].push(j);
                    neighbours[j].push(i);
                }
            }
        }
        for list in &mut neighbours {
            list.sort_unstable();
        }
        neighbours
    }
}

impl Default for DbscanIdentityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON, DEFAULT_MIN_SAMPLES)
    }
}

impl IdentityResolver for DbscanIdentityResolver {
    fn resolve(&self, embeddings: &[&[f32]]) -> Vec<Option<IdentityLabel>> {
        let n = embeddings.len();
        let neighbours = self.neighbourhoods(embeddings);
        let mut labels: Vec<Option<IdentityLabel>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut next_label: IdentityLabel = 0;

        for seed in 0..n {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            if neighbours[seed].len() < self.min_samples {
                continue;
            }

            let label = next_label;
            next_label += 1;
            labels[seed] = Some(label);

            let mut frontier: VecDeque<usize> = neighbours[seed].iter().copied().collect();
            while let Some(face) = frontier.pop_front() {
                if labels[face].is_none() {
                    labels[face] = Some(label);
                }
                if visited[face] {
                    continue;
                }
                visited[face] = true;
                if neighbours[face].len() >= self.min_samples {
                    frontier.extend(neighbours[face].iter().copied());
                }
            }
        }

        labels
    }

    fn name(&self) -> &'static str {
        "dbscan"
    }
}
