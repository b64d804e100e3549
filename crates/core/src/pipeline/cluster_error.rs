use thiserror::Error;

/// Caller contract violations detected before clustering starts.
///
/// Degenerate batches (empty, faceless, no primary person) are not errors;
/// they produce a valid result with every photo in extras.
#[derive(Error, Debug, PartialEq)]
pub enum ClusterError {
    #[error("batch of {size} photos exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
    #[error("photo {photo} face {face}: embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        photo: usize,
        face: usize,
        expected: usize,
        actual: usize,
    },
    #[error("photo {photo}: color descriptor has {actual} dimensions, expected {expected}")]
    ColorDimensionMismatch {
        photo: usize,
        expected: usize,
        actual: usize,
    },
    #[error("photo {photo}: feature vector contains a non-finite value")]
    NonFiniteValue { photo: usize },
}
