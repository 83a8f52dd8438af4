//! The similarity engine: dimension checks, dedup, scoring, ranking.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::error::RecommendError;
use crate::model::{
    FeatureStats, Recommendations, RecommendationRequest, ScoredCandidate, Track,
    DIMENSIONS, DIMENSION_NAMES,
};
use crate::scoring::{self, Method};

/// Default result limit when the request doesn't specify one.
pub const DEFAULT_LIMIT: usize = 20;

/// Stateless scoring engine. Holds only read-only configuration, so one
/// instance can serve any number of concurrent requests and differently-tuned
/// engines don't interfere with each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine {
    config: EngineConfig,
}

impl SimilarityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rank candidates against the request's target.
    ///
    /// Deterministic for a given input: the sort is stable, so candidates
    /// with equal scores keep their input order, and on a repeated track id
    /// the first occurrence wins. The target's own id never appears in the
    /// output. An empty candidate set (before or after filtering) yields an
    /// empty result, not an error.
    pub fn recommend(
        &self,
        request: RecommendationRequest,
    ) -> Result<Recommendations, RecommendError> {
        let RecommendationRequest {
            target,
            candidates,
            method,
            limit,
        } = request;

        let candidates_considered = candidates.len();
        let dim = target.features.len();

        // Every candidate must share the target's dimensionality
        for candidate in &candidates {
            if candidate.features.len() != dim {
                return Err(RecommendError::MalformedVector {
                    expected: dim,
                    found: candidate.features.len(),
                });
            }
        }

        // Drop the target itself, then repeated ids (first occurrence wins)
        let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
        let mut survivors = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.id == target.id {
                log::debug!("Dropping self-referential candidate {}", candidate.id);
                continue;
            }
            if seen.insert(candidate.id.clone()) {
                survivors.push(candidate);
            } else {
                log::debug!("Dropping duplicate candidate {}", candidate.id);
            }
        }

        let mut results = Vec::with_capacity(survivors.len());
        for track in survivors {
            let (score, sub_scores) = scoring::score_pair(
                method,
                target.features.values(),
                track.features.values(),
                &self.config.weights,
                &self.config.blend,
            )?;
            let reasons = sub_scores
                .as_ref()
                .map(scoring::reasons)
                .unwrap_or_default();
            results.push(ScoredCandidate {
                track,
                score,
                reasons,
                sub_scores,
            });
        }

        // Stable descending sort keeps equal scores in input order
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        log::info!(
            "Ranked {} of {} candidates for \"{}\" ({})",
            results.len(),
            candidates_considered,
            target.name,
            method
        );

        Ok(Recommendations {
            target,
            method,
            candidates_considered,
            results,
        })
    }

    /// Per-dimension absolute differences between two tracks, in dimension
    /// order — the data behind the comparison chart.
    pub fn feature_differences(
        &self,
        a: &Track,
        b: &Track,
    ) -> Result<Vec<(&'static str, f64)>, RecommendError> {
        require_dims(a.features.len(), DIMENSIONS)?;
        require_dims(b.features.len(), DIMENSIONS)?;

        Ok(a.features
            .values()
            .iter()
            .zip(b.features.values())
            .zip(DIMENSION_NAMES)
            .map(|((x, y), name)| (name, (x - y).abs()))
            .collect())
    }

    /// Per-dimension statistics (mean/std/min/max/median) across a track set.
    pub fn feature_summary(
        &self,
        tracks: &[Track],
    ) -> Result<Vec<(&'static str, FeatureStats)>, RecommendError> {
        for track in tracks {
            require_dims(track.features.len(), DIMENSIONS)?;
        }
        if tracks.is_empty() {
            return Ok(Vec::new());
        }

        let n = tracks.len() as f64;
        let mut summary = Vec::with_capacity(DIMENSIONS);

        for (d, name) in DIMENSION_NAMES.iter().enumerate() {
            let mut vals: Vec<f64> = tracks.iter().map(|t| t.features.values()[d]).collect();
            let mean = vals.iter().sum::<f64>() / n;
            let var = vals.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
            let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
            let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            summary.push((
                *name,
                FeatureStats {
                    mean,
                    std: var.sqrt(),
                    min,
                    max,
                    median: median(&mut vals),
                },
            ));
        }

        Ok(summary)
    }

    /// Pairwise similarity matrix: `matrix[i][j]` is the score of track `j`
    /// against track `i` under the given method. Rows are computed in
    /// parallel — tens of tracks don't need it, but batch callers do.
    pub fn similarity_matrix(
        &self,
        tracks: &[Track],
        method: Method,
    ) -> Result<Vec<Vec<f64>>, RecommendError> {
        let Some(first) = tracks.first() else {
            return Ok(Vec::new());
        };
        let dim = first.features.len();
        for track in tracks {
            require_dims(track.features.len(), dim)?;
        }

        let vectors: Vec<&[f64]> = tracks.iter().map(|t| t.features.values()).collect();

        (0..vectors.len())
            .into_par_iter()
            .map(|i| {
                vectors
                    .iter()
                    .map(|&other| {
                        scoring::score_pair(
                            method,
                            vectors[i],
                            other,
                            &self.config.weights,
                            &self.config.blend,
                        )
                        .map(|(score, _)| score)
                    })
                    .collect::<Result<Vec<f64>, _>>()
            })
            .collect()
    }

    /// How varied a track set is: mean pairwise euclidean distance,
    /// normalized by the maximum possible distance for unit-bounded
    /// dimensions (`sqrt(dim)`). 0 for fewer than two tracks.
    pub fn diversity_score(&self, tracks: &[Track]) -> Result<f64, RecommendError> {
        if tracks.len() < 2 {
            return Ok(0.0);
        }
        let dim = tracks[0].features.len();
        for track in tracks {
            require_dims(track.features.len(), dim)?;
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for i in 0..tracks.len() {
            for j in (i + 1)..tracks.len() {
                let dist = tracks[i]
                    .features
                    .values()
                    .iter()
                    .zip(tracks[j].features.values())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f64>()
                    .sqrt();
                total += dist;
                pairs += 1;
            }
        }

        let max_dist = (dim as f64).sqrt().max(1e-10);
        Ok((total / pairs as f64 / max_dist).clamp(0.0, 1.0))
    }
}

fn require_dims(found: usize, expected: usize) -> Result<(), RecommendError> {
    if found == expected {
        Ok(())
    } else {
        Err(RecommendError::MalformedVector { expected, found })
    }
}

fn median(v: &mut [f64]) -> f64 {
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = v.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        v[n / 2]
    } else {
        (v[n / 2 - 1] + v[n / 2]) / 2.0
    }
}
