use thiserror::Error;

/// Errors from the recommendation core. Structural problems only —
/// out-of-range raw feature values are clamped during normalization and
/// an empty candidate set is a normal empty result, not an error.
#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("feature vector has {found} dimensions, expected {expected}")]
    MalformedVector { expected: usize, found: usize },

    #[error("unknown scoring method \"{0}\" (expected feature_based, cosine, euclidean, or weighted)")]
    UnknownMethod(String),
}
