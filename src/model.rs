use serde::{Deserialize, Serialize};

use crate::scoring::Method;

/// Number of dimensions in a normalized feature vector.
pub const DIMENSIONS: usize = 8;

/// Dimension names, in vector order.
pub const DIMENSION_NAMES: [&str; DIMENSIONS] = [
    "danceability",
    "energy",
    "valence",
    "acousticness",
    "instrumentalness",
    "liveness",
    "speechiness",
    "tempo_normalized",
];

/// Dimension indices, in vector order.
pub mod idx {
    pub const DANCEABILITY: usize = 0;
    pub const ENERGY: usize = 1;
    pub const VALENCE: usize = 2;
    pub const ACOUSTICNESS: usize = 3;
    pub const INSTRUMENTALNESS: usize = 4;
    pub const LIVENESS: usize = 5;
    pub const SPEECHINESS: usize = 6;
    pub const TEMPO: usize = 7;
}

/// Raw audio features as supplied by the upstream metadata source.
/// Bounded features are expected in [0,1]; tempo is unbounded BPM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrackFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub speechiness: f64,
    pub tempo_bpm: f64,
}

/// A track record as it arrives from the upstream source: display metadata
/// plus raw (un-normalized) audio features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(flatten)]
    pub features: RawTrackFeatures,
}

/// An ordered, fixed-length numeric encoding of a track's audio
/// characteristics. Vectors built by the [`Normalizer`](crate::features::Normalizer)
/// always have [`DIMENSIONS`] entries in [`DIMENSION_NAMES`] order;
/// hand-built vectors may not, which is what the engine's dimensionality
/// check guards against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dimension name / value pairs, for charts and tables.
    /// Stops early if the vector has fewer than [`DIMENSIONS`] entries.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        DIMENSION_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

/// A track ready for scoring: opaque identity, display metadata (passed
/// through untouched), and one normalized feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub features: FeatureVector,
}

/// One recommendation request: target, candidate set, method, result limit.
/// Passed by value into the engine; the engine retains nothing afterwards.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub target: Track,
    pub candidates: Vec<Track>,
    pub method: Method,
    pub limit: usize,
}

impl RecommendationRequest {
    /// Build a request with the default result limit.
    pub fn new(target: Track, candidates: Vec<Track>, method: Method) -> Self {
        Self {
            target,
            candidates,
            method,
            limit: crate::engine::DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// The four sub-scores behind a feature-based score, exposed for debugging
/// and for reason-string generation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubScores {
    pub overall: f64,
    pub mood: f64,
    pub style: f64,
    pub tempo: f64,
}

/// A candidate with its computed similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub track: Track,
    /// Similarity in [0,1], 1 = identical feature vector.
    pub score: f64,
    /// Human-readable reasons (feature_based method only), strongest first.
    pub reasons: Vec<String>,
    /// Sub-score breakdown (feature_based method only).
    pub sub_scores: Option<SubScores>,
}

impl ScoredCandidate {
    /// Score as a display percentage, rounded to one decimal.
    pub fn score_percent(&self) -> f64 {
        (self.score * 1000.0).round() / 10.0
    }
}

/// The ranked result of one recommendation request.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    /// Target echoed back for display.
    pub target: Track,
    pub method: Method,
    /// Candidate count before self-exclusion, dedup and truncation
    /// (for UI transparency: "N candidates, M returned").
    pub candidates_considered: usize,
    pub results: Vec<ScoredCandidate>,
}

/// Per-dimension statistics across a track set.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}
