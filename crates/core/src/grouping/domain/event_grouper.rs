use std::collections::HashMap;

use crate::grouping::domain::event_group::EventGroup;
use crate::identity::domain::identity_resolver::IdentityLabel;
use crate::identity::domain::photo_signature::PhotoSignature;
use crate::shared::constants::OUTFIT_THRESHOLD;
use crate::shared::photo_record::PhotoRecord;
use crate::shared::similarity::color_distance;

pub const DEFAULT_OUTFIT_THRESHOLD: f64 = OUTFIT_THRESHOLD;

/// Builds events from photos that contain the primary person.
///
/// Photos are first grouped by exact signature, then each group is split
/// by outfit: the first unplaced photo seeds a sub-group and collects every
/// other unplaced photo whose outfit is within the threshold of the seed.
/// Membership is tested against the seed only, so one signature may split
/// into several events. Output follows input batch order.
pub struct EventGrouper {
    outfit_threshold: f64,
}

impl EventGrouper {
    pub fn new(outfit_threshold: f64) -> Self {
        Self { outfit_threshold }
    }

    /// Returns the events, numbered `Event_1..` in creation order.
    ///
    /// Photos whose signature lacks `primary` are left for the extras pass.
    pub fn group(
        &self,
        photos: &[PhotoRecord],
        signatures: &[PhotoSignature],
        primary: IdentityLabel,
    ) -> Vec<EventGroup> {
        let mut events = Vec::new();
        for (signature, members) in group_by_signature(signatures, primary) {
            for split in self.split_by_outfit(photos, &members) {
                let mut event = EventGroup::new(events.len() + 1, signature.clone());
                for idx in split {
                    event.add_member(idx, &photos[idx]);
                }
                events.push(event);
            }
        }
        events
    }

    fn split_by_outfit(&self, photos: &[PhotoRecord], members: &[usize]) -> Vec<Vec<usize>> {
        if members.len() <= 1 {
            return vec![members.to_vec()];
        }

        let mut placed = vec![false; members.len()];
        let mut splits = Vec::new();
        for seed_pos in 0..members.len() {
            if placed[seed_pos] {
                continue;
            }
            placed[seed_pos] = true;
            let seed = members[seed_pos];
            let mut split = vec![seed];

            for other_pos in (seed_pos + 1)..members.len() {
                if placed[other_pos] {
                    continue;
                }
                let other = members[other_pos];
                let distance = color_distance(&photos[seed].color, &photos[other].color);
                if distance < self.outfit_threshold {
                    placed[other_pos] = true;
                    split.push(other);
                }
            }
            splits.push(split);
        }
        splits
    }
}

impl Default for EventGrouper {
    fn default() -> Self {
        Self::new(DEFAULT_OUTFIT_THRESHOLD)
    }
}

/// Groups photo indices by identical signature, keeping only signatures
/// that contain `primary`. Groups appear in order of their first photo.
fn group_by_signature(
    signatures: &[PhotoSignature],
    primary: IdentityLabel,
) -> Vec<(PhotoSignature, Vec<usize>)> {
    let mut groups: Vec<(PhotoSignature, Vec<usize>)> = Vec::new();
    let mut positions: HashMap<&PhotoSignature, usize> = HashMap::new();

    for (idx, signature) in signatures.iter().enumerate() {
        if !signature.contains(primary) {
            continue;
        }
        match positions.get(signature) {
            Some(&pos) => groups[pos].1.push(idx),
            None => {
                positions.insert(signature, groups.len());
                groups.push((signature.clone(), vec![idx]));
            }
        }
    }
    groups
}
