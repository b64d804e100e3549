use serde::{Deserialize, Serialize};

use crate::grouping::domain::event_group::{EventGroup, ExtrasBucket};
use crate::identity::domain::identity_map::IdentityMap;
use crate::shared::constants::{EXTRAS_RATIO, MATCH_THRESHOLD};
use crate::shared::photo_record::PhotoRecord;
use crate::shared::similarity::cosine_similarity;

pub const DEFAULT_RATIO: f64 = EXTRAS_RATIO;

/// How a leftover photo's face is judged to be shared with an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedFaceMatching {
    /// The face's identity label is in the event's signature. Noise faces
    /// never match.
    #[default]
    IdentityLabel,
    /// The face is cosine-similar to any of the event's reference faces.
    Cosine,
}

/// Places photos the event grouper left behind.
///
/// A photo joins the first event (in creation order) with which it shares
/// at least `ratio` of its faces; otherwise it goes to the extras bucket.
/// Faceless photos always go to extras.
pub struct ExtrasResolver {
    ratio: f64,
    matching: SharedFaceMatching,
    match_threshold: f64,
}

impl ExtrasResolver {
    pub fn new(ratio: f64, matching: SharedFaceMatching, match_threshold: f64) -> Self {
        Self {
            ratio,
            matching,
            match_threshold,
        }
    }

    pub fn resolve(
        &self,
        photos: &[PhotoRecord],
        identities: &IdentityMap,
        events: &mut [EventGroup],
    ) -> ExtrasBucket {
        let mut placed = vec![false; photos.len()];
        for event in events.iter() {
            for &idx in &event.photo_indices {
                placed[idx] = true;
            }
        }

        let mut extras = ExtrasBucket::default();
        for (idx, photo) in photos.iter().enumerate() {
            if placed[idx] {
                continue;
            }
            match self.find_event(idx, photos, identities, events) {
                Some(event_pos) => {
                    let event = &mut events[event_pos];
                    log::debug!("{} attached to {}", photo.display_name(), event.name);
                    event.attach(idx, photo);
                }
                None => {
                    log::debug!("{} moved to extras", photo.display_name());
                    extras.push(idx, photo);
                }
            }
        }
        extras
    }

    fn find_event(
        &self,
        photo_idx: usize,
        photos: &[PhotoRecord],
        identities: &IdentityMap,
        events: &[EventGroup],
    ) -> Option<usize> {
        let face_count = photos[photo_idx].face_count();
        if face_count == 0 {
            return None;
        }
        events.iter().position(|event| {
            let shared = self.shared_faces(photo_idx, photos, identities, event);
            shared as f64 / face_count as f64 >= self.ratio
        })
    }

    /// Number of the photo's faces that match the event, each counted once.
    fn shared_faces(
        &self,
        photo_idx: usize,
        photos: &[PhotoRecord],
        identities: &IdentityMap,
        event: &EventGroup,
    ) -> usize {
        match self.matching {
            SharedFaceMatching::IdentityLabel => identities
                .photo_labels(photo_idx)
                .iter()
                .flatten()
                .filter(|&&label| event.signature.contains(label))
                .count(),
            SharedFaceMatching::Cosine => {
                let references: Vec<&[f32]> = event
                    .reference_photos()
                    .iter()
                    .flat_map(|&ref_idx| photos[ref_idx].faces.iter())
                    .map(|face| face.embedding.as_slice())
                    .collect();
                photos[photo_idx]
                    .faces
                    .iter()
                    .filter(|face| {
                        references.iter().any(|reference| {
                            cosine_similarity(&face.embedding, reference) > self.match_threshold
                        })
                    })
                    .count()
            }
        }
    }
}

impl Default for ExtrasResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RATIO, SharedFaceMatching::default(), MATCH_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::domain::identity_resolver::{IdentityLabel, IdentityResolver};
    use crate::identity::domain::photo_signature::PhotoSignature;
    use crate::shared::photo_record::FaceObservation;

    struct ScriptedResolver(Vec<Option<IdentityLabel>>);

    impl IdentityResolver for ScriptedResolver {
        fn resolve(&self, _embeddings: &[&[f32]]) -> Vec<Option<IdentityLabel>> {
            self.0.clone()
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn at_angle(degrees: f64) -> Vec<f32> {
        let r = degrees.to_radians();
        vec![r.cos() as f32, r.sin() as f32]
    }

    fn photo(url: &str, face_angles: &[f64]) -> PhotoRecord {
        let faces = face_angles
            .iter()
            .map(|&d| FaceObservation::new(at_angle(d)))
            .collect();
        PhotoRecord::new(url, url, faces, vec![0.0])
    }

    fn event(number: usize, labels: &[IdentityLabel], members: &[usize], photos: &[PhotoRecord]) -> EventGroup {
        let mut event = EventGroup::new(number, labels.iter().copied().collect::<PhotoSignature>());
        for &idx in members {
            event.add_member(idx, &photos[idx]);
        }
        event
    }

    #[test]
    fn test_shared_identity_attaches_photo() {
        // photo 0: {0}, photo 1: {0, 1, 2} shares 1/3 >= 0.3
        let photos = vec![photo("a", &[0.0]), photo("b", &[0.0, 90.0, 180.0])];
        let identities = IdentityMap::resolve(
            &photos,
            &ScriptedResolver(vec![Some(0), Some(0), Some(1), Some(2)]),
        );
        let mut events = vec![event(1, &[0], &[0], &photos)];

        let extras = ExtrasResolver::default().resolve(&photos, &identities, &mut events);

        assert!(extras.is_empty());
        assert_eq!(events[0].urls, vec!["a", "b"]);
        assert_eq!(events[0].attached_photos(), &[1]);
        assert_eq!(events[0].reference_photos(), &[0]);
    }

    #[test]
    fn test_below_ratio_goes_to_extras() {
        // 1 of 4 faces shared = 0.25 < 0.3
        let photos = vec![photo("a", &[0.0]), photo("b", &[0.0, 90.0, 180.0, 270.0])];
        let identities = IdentityMap::resolve(
            &photos,
            &ScriptedResolver(vec![Some(0), Some(0), Some(1), Some(2), Some(3)]),
        );
        let mut events = vec![event(1, &[0], &[0], &photos)];

        let extras = ExtrasResolver::default().resolve(&photos, &identities, &mut events);

        assert_eq!(extras.urls(), vec!["b"]);
        assert_eq!(extras.entries[0].face_count, 4);
        assert_eq!(events[0].len(), 1);
    }

    #[test]
    fn test_faceless_photo_goes_to_extras() {
        let photos = vec![photo("a", &[0.0]), photo("b", &[])];
        let identities = IdentityMap::resolve(&photos, &ScriptedResolver(vec![Some(0)]));
        let mut events = vec![event(1, &[0], &[0], &photos)];

        let extras = ExtrasResolver::default().resolve(&photos, &identities, &mut events);

        assert_eq!(extras.urls(), vec!["b"]);
        assert_eq!(extras.entries[0].face_count, 0);
    }

    #[test]
    fn test_first_matching_event_wins() {
        let photos = vec![
            photo("a", &[0.0]),
            photo("b", &[0.0, 90.0]),
            photo("c", &[0.0]),
        ];
        let identities = IdentityMap::resolve(
            &photos,
            &ScriptedResolver(vec![Some(0), Some(0), Some(1), Some(0)]),
        );
        // photo 2 matches both events; creation order decides
        let mut events = vec![event(1, &[0], &[0], &photos), event(2, &[0, 1], &[1], &photos)];

        let extras = ExtrasResolver::default().resolve(&photos, &identities, &mut events);

        assert!(extras.is_empty());
        assert_eq!(events[0].urls, vec!["a", "c"]);
        assert_eq!(events[1].urls, vec!["b"]);
    }

    #[test]
    fn test_noise_faces_never_match_by_label() {
        let photos = vec![photo("a", &[0.0]), photo("b", &[0.0])];
        let identities = IdentityMap::resolve(&photos, &ScriptedResolver(vec![Some(0), None]));
        let mut events = vec![event(1, &[0], &[0], &photos)];

        let extras = ExtrasResolver::default().resolve(&photos, &identities, &mut events);

        assert_eq!(extras.urls(), vec!["b"]);
    }

    #[test]
    fn test_cosine_matching_uses_reference_faces() {
        // Labels disagree, but the embeddings are 10° apart
        let photos = vec![photo("a", &[0.0]), photo("b", &[10.0, 180.0])];
        let identities = IdentityMap::resolve(
            &photos,
            &ScriptedResolver(vec![Some(0), Some(1), Some(2)]),
        );
        let mut events = vec![event(1, &[0], &[0], &photos)];
        let resolver = ExtrasResolver::new(DEFAULT_RATIO, SharedFaceMatching::Cosine, MATCH_THRESHOLD);

        let extras = resolver.resolve(&photos, &identities, &mut events);

        assert!(extras.is_empty());
        assert_eq!(events[0].urls, vec!["a", "b"]);
    }

    #[test]
    fn test_attached_photos_do_not_extend_reference_faces() {
        // c only resembles b, which was attached rather than a member
        let photos = vec![
            photo("a", &[0.0]),
            photo("b", &[10.0, 120.0]),
            photo("c", &[120.0]),
        ];
        let identities = IdentityMap::resolve(
            &photos,
            &ScriptedResolver(vec![Some(0), Some(1), Some(2), Some(3)]),
        );
        let mut events = vec![event(1, &[0], &[0], &photos)];
        let resolver = ExtrasResolver::new(DEFAULT_RATIO, SharedFaceMatching::Cosine, MATCH_THRESHOLD);

        let extras = resolver.resolve(&photos, &identities, &mut events);

        assert_eq!(events[0].urls, vec!["a", "b"]);
        assert_eq!(extras.urls(), vec!["c"]);
    }

    #[test]
    fn test_no_events_sends_everything_left_to_extras() {
        let photos = vec![photo("a", &[0.0]), photo("b", &[])];
        let identities = IdentityMap::resolve(&photos, &ScriptedResolver(vec![Some(0)]));
        let extras = ExtrasResolver::default().resolve(&photos, &identities, &mut []);
        assert_eq!(extras.urls(), vec!["a", "b"]);
    }

    #[test]
    fn test_matching_deserializes_snake_case() {
        let m: SharedFaceMatching = serde_json::from_str("\"identity_label\"").unwrap();
        assert_eq!(m, SharedFaceMatching::IdentityLabel);
        let m: SharedFaceMatching = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(m, SharedFaceMatching::Cosine);
    }
}
