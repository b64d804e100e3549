use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use crate::identity::domain::identity_resolver::{IdentityLabel, IdentityResolver};
use crate::shared::photo_record::PhotoRecord;

/// Result of one identity-resolution pass over a whole batch.
///
/// Faces are addressed by their position in the batch-wide flattening
/// (photo order, then face order within the photo).
#[derive(Clone, Debug)]
pub struct IdentityMap {
    labels: Vec<Option<IdentityLabel>>,
    face_photo: Vec<usize>,
    photo_faces: Vec<Range<usize>>,
    members: BTreeMap<IdentityLabel, Vec<usize>>,
}

impl IdentityMap {
    /// Flattens every face in the batch and runs `resolver` over all of them.
    pub fn resolve(photos: &[PhotoRecord], resolver: &dyn IdentityResolver) -> Self {
        let mut embeddings: Vec<&[f32]> = Vec::new();
        let mut face_photo = Vec::new();
        let mut photo_faces = Vec::with_capacity(photos.len());

        for (photo_idx, photo) in photos.iter().enumerate() {
            let start = embeddings.len();
            for face in &photo.faces {
                embeddings.push(&face.embedding);
                face_photo.push(photo_idx);
            }
            photo_faces.push(start..embeddings.len());
        }

        let labels = resolver.resolve(&embeddings);
        assert_eq!(
            labels.len(),
            embeddings.len(),
            "{} returned {} labels for {} faces",
            resolver.name(),
            labels.len(),
            embeddings.len()
        );

        Self::from_labels(labels, face_photo, photo_faces)
    }

    fn from_labels(
        labels: Vec<Option<IdentityLabel>>,
        face_photo: Vec<usize>,
        photo_faces: Vec<Range<usize>>,
    ) -> Self {
        let mut members: BTreeMap<IdentityLabel, Vec<usize>> = BTreeMap::new();
        for (face_idx, label) in labels.iter().enumerate() {
            if let Some(label) = label {
                members.entry(*label).or_default().push(face_idx);
            }
        }
        Self {
            labels,
            face_photo,
            photo_faces,
            members,
        }
    }

    /// Identity label → flattened face indices, ordered by label.
    pub fn identities(&self) -> &BTreeMap<IdentityLabel, Vec<usize>> {
        &self.members
    }

    pub fn identity_count(&self) -> usize {
        self.members.len()
    }

    pub fn face_count(&self) -> usize {
        self.labels.len()
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }

    pub fn label(&self, face_idx: usize) -> Option<IdentityLabel> {
        self.labels[face_idx]
    }

    pub fn photo_of(&self, face_idx: usize) -> usize {
        self.face_photo[face_idx]
    }

    /// Labels of the faces in one photo, in face order.
    pub fn photo_labels(&self, photo_idx: usize) -> &[Option<IdentityLabel>] {
        &self.labels[self.photo_faces[photo_idx].clone()]
    }

    /// Distinct photos in which `label` appears.
    pub fn distinct_photos(&self, label: IdentityLabel) -> BTreeSet<usize> {
        self.members
            .get(&label)
            .map(|faces| faces.iter().map(|&f| self.face_photo[f]).collect())
            .unwrap_or_default()
    }
}
