/// Cosine-distance radius under which two faces resolve to the same identity.
pub const IDENTITY_EPSILON: f64 = 0.32;

/// Smallest neighbourhood (self included) that seeds an identity.
/// At 1 every face receives a label and nothing is discarded as noise.
pub const MIN_IDENTITY_SIZE: usize = 1;

/// Cosine similarity above which two faces are the same person.
/// Equivalent to `1.0 - IDENTITY_EPSILON`.
pub const MATCH_THRESHOLD: f64 = 0.68;

/// Outfit descriptor distance below which two photos share an outfit.
pub const OUTFIT_THRESHOLD: f64 = 40.0;

/// Fraction of a leftover photo's faces that must be shared with an event
/// before the photo is attached to it.
pub const EXTRAS_RATIO: f64 = 0.3;

/// Batch cap the CLI applies unless told otherwise. The engine itself has none.
pub const MAX_BATCH_SIZE: usize = 20;

pub const EVENT_NAME_PREFIX: &str = "Event_";

/// Guards cosine similarity against zero-norm vectors.
pub const COSINE_EPSILON: f64 = 1e-10;
