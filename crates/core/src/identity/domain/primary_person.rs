use crate::identity::domain::identity_map::IdentityMap;
use crate::identity::domain::identity_resolver::IdentityLabel;

/// Picks the identity that appears in the most distinct photos.
///
/// Repeated faces of one identity within a single photo count once.
/// Ties go to the lowest label. Returns `None` when no identity exists.
pub fn select_primary(identities: &IdentityMap) -> Option<IdentityLabel> {
    let mut best: Option<(IdentityLabel, usize)> = None;
    for &label in identities.identities().keys() {
        let photos = identities.distinct_photos(label).len();
        if best.map_or(true, |(_, count)| photos > count) {
            best = Some((label, photos));
        }
    }
    best.map(|(label, _)| label)
}
