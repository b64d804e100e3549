use std::collections::BTreeSet;

use serde::Serialize;

use crate::identity::domain::identity_map::IdentityMap;
use crate::identity::domain::identity_resolver::IdentityLabel;

/// The set of identities detected in one photo.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PhotoSignature(BTreeSet<IdentityLabel>);

impl PhotoSignature {
    pub fn contains(&self, label: IdentityLabel) -> bool {
        self.0.contains(&label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = IdentityLabel> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<IdentityLabel> for PhotoSignature {
    fn from_iter<I: IntoIterator<Item = IdentityLabel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One signature per photo, in batch order. Noise faces contribute nothing.
pub fn build_signatures(identities: &IdentityMap, photo_count: usize) -> Vec<PhotoSignature> {
    (0..photo_count)
        .map(|photo_idx| {
            identities
                .photo_labels(photo_idx)
                .iter()
                .flatten()
                .copied()
                .collect()
        })
        .collect()
}
