//! The four similarity scoring methods.
//!
//! Every method maps a target/candidate vector pair into [0,1] with 1 =
//! identical, so methods are interchangeable from the caller's side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{BlendWeights, FeatureWeights};
use crate::error::RecommendError;
use crate::model::{idx, SubScores, DIMENSIONS};

/// Selectable scoring method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    FeatureBased,
    Cosine,
    Euclidean,
    Weighted,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::FeatureBased,
        Method::Cosine,
        Method::Euclidean,
        Method::Weighted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FeatureBased => "feature_based",
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::Weighted => "weighted",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::FeatureBased => {
                "blend of mood, style, tempo and overall sub-scores (default, with reasons)"
            }
            Self::Cosine => "cosine of the angle between feature vectors",
            Self::Euclidean => "inverted euclidean distance",
            Self::Weighted => "inverted euclidean distance with per-feature importance weights",
        }
    }
}

impl FromStr for Method {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feature_based" => Ok(Self::FeatureBased),
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            "weighted" => Ok(Self::Weighted),
            _ => Err(RecommendError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mood sub-score weighting: valence matters more than energy.
const MOOD_VALENCE_WEIGHT: f64 = 0.6;
const MOOD_ENERGY_WEIGHT: f64 = 0.4;

/// Style sub-score: acousticness and instrumentalness weigh equally.
const STYLE_SPLIT: f64 = 0.5;

/// A sub-score must clear this to show up as a reason string.
const REASON_THRESHOLD: f64 = 0.85;

/// Maximum number of reason strings per candidate.
const MAX_REASONS: usize = 3;

/// Score a candidate against a target with the given method. The engine has
/// already checked that both slices have equal length; `weighted` and
/// `feature_based` additionally need the full named dimension set, since
/// their weight tables are defined per dimension.
pub fn score_pair(
    method: Method,
    target: &[f64],
    candidate: &[f64],
    weights: &FeatureWeights,
    blend: &BlendWeights,
) -> Result<(f64, Option<SubScores>), RecommendError> {
    match method {
        Method::Euclidean => Ok((euclidean(target, candidate), None)),
        Method::Cosine => Ok((cosine(target, candidate), None)),
        Method::Weighted => {
            require_full_dimensions(target)?;
            Ok((weighted(target, candidate, &weights.as_array()), None))
        }
        Method::FeatureBased => {
            require_full_dimensions(target)?;
            let (score, sub) = feature_based(target, candidate, &weights.as_array(), blend);
            Ok((score, Some(sub)))
        }
    }
}

fn require_full_dimensions(v: &[f64]) -> Result<(), RecommendError> {
    if v.len() == DIMENSIONS {
        Ok(())
    } else {
        Err(RecommendError::MalformedVector {
            expected: DIMENSIONS,
            found: v.len(),
        })
    }
}

/// Plain euclidean distance inverted into a similarity in (0,1].
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    let dist = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt();
    1.0 / (1.0 + dist)
}

/// Cosine similarity, clamped to [0,1]. A zero vector has no direction,
/// so either norm vanishing yields 0.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}

/// Euclidean similarity with each dimension's difference scaled by its
/// importance weight before the distance computation.
pub fn weighted(a: &[f64], b: &[f64], weights: &[f64; DIMENSIONS]) -> f64 {
    let dist = a
        .iter()
        .zip(b)
        .zip(weights)
        .map(|((x, y), w)| {
            let d = w * (x - y);
            d * d
        })
        .sum::<f64>()
        .sqrt();
    1.0 / (1.0 + dist)
}

/// The feature_based method: four named sub-scores, each an inverted
/// normalized distance in its own sub-space, blended by fixed weights.
/// Returns the sub-scores alongside the combined score; reason strings are
/// derived from these exact values.
pub fn feature_based(
    a: &[f64],
    b: &[f64],
    weights: &[f64; DIMENSIONS],
    blend: &BlendWeights,
) -> (f64, SubScores) {
    let delta = |i: usize| (a[i] - b[i]).abs();

    let mood_diff =
        MOOD_VALENCE_WEIGHT * delta(idx::VALENCE) + MOOD_ENERGY_WEIGHT * delta(idx::ENERGY);
    let mood = invert(mood_diff);

    let style_diff =
        STYLE_SPLIT * delta(idx::ACOUSTICNESS) + STYLE_SPLIT * delta(idx::INSTRUMENTALNESS);
    let style = invert(style_diff);

    let tempo = invert(delta(idx::TEMPO));

    // Overall: weighted mean absolute difference across all dimensions
    let mut weighted_diff = 0.0;
    let mut total_weight = 0.0;
    for i in 0..DIMENSIONS {
        weighted_diff += weights[i] * delta(i);
        total_weight += weights[i];
    }
    let overall = invert(weighted_diff / total_weight.max(1e-10));

    let sub = SubScores {
        overall,
        mood,
        style,
        tempo,
    };
    // Blend weights sum to 1.0 only nominally; clamp the float residue
    let score = (blend.overall * overall + blend.mood * mood + blend.style * style
        + blend.tempo * tempo)
        .clamp(0.0, 1.0);
    (score, sub)
}

/// Invert a non-negative difference into a similarity in (0,1].
fn invert(diff: f64) -> f64 {
    1.0 / (1.0 + diff)
}

/// Reason strings for a feature-based score, strongest sub-score first.
/// Derived from the same sub-scores that produced the rank, never
/// recomputed, so displayed reasoning always agrees with the ordering.
pub fn reasons(sub: &SubScores) -> Vec<String> {
    let mut labeled = [
        (sub.mood, "similar mood"),
        (sub.style, "similar style"),
        (sub.tempo, "similar tempo"),
        (sub.overall, "overall feature match"),
    ];
    labeled.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    labeled
        .iter()
        .filter(|(score, _)| *score >= REASON_THRESHOLD)
        .take(MAX_REASONS)
        .map(|(_, label)| (*label).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::Normalizer;
    use crate::model::RawTrackFeatures;

    fn default_weights() -> [f64; DIMENSIONS] {
        FeatureWeights::default().as_array()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("feature_based".parse::<Method>().unwrap(), Method::FeatureBased);
        assert_eq!("cosine".parse::<Method>().unwrap(), Method::Cosine);
        assert_eq!("euclidean".parse::<Method>().unwrap(), Method::Euclidean);
        assert_eq!("weighted".parse::<Method>().unwrap(), Method::Weighted);

        let err = "bogus".parse::<Method>().unwrap_err();
        assert!(matches!(err, RecommendError::UnknownMethod(ref s) if s == "bogus"));
    }

    #[test]
    fn test_euclidean_identical_is_one() {
        let a = vec![0.3, 0.7, 0.5, 0.2, 0.0, 0.1, 0.05, 0.4];
        assert_eq!(euclidean(&a, &a), 1.0);
    }

    #[test]
    fn test_euclidean_decreases_with_distance() {
        let a = vec![0.5, 0.5];
        let near = vec![0.5, 0.6];
        let far = vec![0.5, 0.9];
        assert!(euclidean(&a, &near) > euclidean(&a, &far));
        assert!(euclidean(&a, &far) > 0.0);
    }

    #[test]
    fn test_cosine_identical_is_one() {
        let a = vec![0.3, 0.7, 0.5, 0.2, 0.1, 0.1, 0.05, 0.4];
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let zero = vec![0.0; 8];
        let a = vec![0.3, 0.7, 0.5, 0.2, 0.1, 0.1, 0.05, 0.4];
        assert_eq!(cosine(&zero, &a), 0.0);
        assert_eq!(cosine(&a, &zero), 0.0);
        assert_eq!(cosine(&zero, &zero), 0.0);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine(&a, &b).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_penalizes_energy_more_than_liveness() {
        // Same magnitude of difference, but energy carries weight 1.5 and
        // liveness only 0.6 — the energy mismatch must score lower.
        let target = vec![0.5; DIMENSIONS];
        let mut energy_off = target.clone();
        energy_off[idx::ENERGY] = 0.8;
        let mut liveness_off = target.clone();
        liveness_off[idx::LIVENESS] = 0.8;

        let w = default_weights();
        assert!(weighted(&target, &energy_off, &w) < weighted(&target, &liveness_off, &w));
    }

    #[test]
    fn test_weighted_identical_is_one() {
        let a = vec![0.3, 0.7, 0.5, 0.2, 0.0, 0.1, 0.05, 0.4];
        assert_eq!(weighted(&a, &a, &default_weights()), 1.0);
    }

    #[test]
    fn test_feature_based_close_tracks_score_high() {
        // Target (valence=0.8, energy=0.7, acousticness=0.1,
        // instrumentalness=0.0, tempo=120 BPM) against a near-identical
        // candidate: every sub-score and the combined score clear 0.9.
        let normalizer = Normalizer::default();
        let target = normalizer.normalize(&RawTrackFeatures {
            danceability: 0.6,
            energy: 0.7,
            valence: 0.8,
            acousticness: 0.1,
            instrumentalness: 0.0,
            liveness: 0.2,
            speechiness: 0.05,
            tempo_bpm: 120.0,
        });
        let candidate = normalizer.normalize(&RawTrackFeatures {
            danceability: 0.6,
            energy: 0.65,
            valence: 0.75,
            acousticness: 0.15,
            instrumentalness: 0.0,
            liveness: 0.2,
            speechiness: 0.05,
            tempo_bpm: 118.0,
        });

        let config = EngineConfig::default();
        let (score, sub) = feature_based(
            target.values(),
            candidate.values(),
            &config.weights.as_array(),
            &config.blend,
        );

        assert!(sub.mood > 0.9, "mood = {}", sub.mood);
        assert!(sub.style > 0.9, "style = {}", sub.style);
        assert!(sub.tempo > 0.9, "tempo = {}", sub.tempo);
        assert!(score > 0.9, "combined = {score}");
    }

    #[test]
    fn test_feature_based_identical_is_one() {
        let a = vec![0.3, 0.7, 0.5, 0.2, 0.0, 0.1, 0.05, 0.4];
        let config = EngineConfig::default();
        let (score, sub) = feature_based(&a, &a, &default_weights(), &config.blend);
        assert!((score - 1.0).abs() < 1e-12);
        assert_eq!(sub.mood, 1.0);
        assert_eq!(sub.overall, 1.0);
    }

    #[test]
    fn test_score_pair_rejects_short_vector_for_weighted() {
        let short = vec![0.5, 0.5, 0.5];
        let weights = FeatureWeights::default();
        let blend = BlendWeights::default();
        let err =
            score_pair(Method::Weighted, &short, &short, &weights, &blend).unwrap_err();
        assert!(matches!(
            err,
            RecommendError::MalformedVector {
                expected: DIMENSIONS,
                found: 3
            }
        ));
    }

    #[test]
    fn test_all_methods_stay_in_unit_interval() {
        let a = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let b = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let weights = FeatureWeights::default();
        let blend = BlendWeights::default();
        for method in Method::ALL {
            let (score, _) = score_pair(method, &a, &b, &weights, &blend).unwrap();
            assert!((0.0..=1.0).contains(&score), "{method}: {score}");
        }
    }

    #[test]
    fn test_reasons_strongest_first_and_capped() {
        let sub = SubScores {
            overall: 0.92,
            mood: 0.99,
            style: 0.95,
            tempo: 0.97,
        };
        let r = reasons(&sub);
        assert_eq!(r, vec!["similar mood", "similar tempo", "similar style"]);
    }

    #[test]
    fn test_reasons_require_threshold() {
        let sub = SubScores {
            overall: 0.5,
            mood: 0.95,
            style: 0.4,
            tempo: 0.3,
        };
        assert_eq!(reasons(&sub), vec!["similar mood"]);

        let weak = SubScores {
            overall: 0.2,
            mood: 0.3,
            style: 0.4,
            tempo: 0.5,
        };
        assert!(reasons(&weak).is_empty());
    }
}
