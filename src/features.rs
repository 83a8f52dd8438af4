//! Feature normalization: raw track records → fixed-order feature vectors.

use crate::config::TempoRange;
use crate::model::{FeatureVector, RawTrack, RawTrackFeatures, Track};

/// Converts raw feature records into fixed-order vectors suitable for
/// similarity math. Pure and stateless apart from the tempo range, so a
/// single instance is safe to use from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    tempo: TempoRange,
}

impl Normalizer {
    pub fn new(tempo: TempoRange) -> Self {
        Self { tempo }
    }

    /// Normalize one raw record. Total over any input: bounded features
    /// outside [0,1] (upstream bug) are clamped to the nearest bound rather
    /// than rejected. Tempo is mapped linearly from the configured BPM range
    /// and clamped at the ends.
    pub fn normalize(&self, raw: &RawTrackFeatures) -> FeatureVector {
        let bounded = |v: f64| v.clamp(0.0, 1.0);
        FeatureVector::from_values(vec![
            bounded(raw.danceability),
            bounded(raw.energy),
            bounded(raw.valence),
            bounded(raw.acousticness),
            bounded(raw.instrumentalness),
            bounded(raw.liveness),
            bounded(raw.speechiness),
            self.normalize_tempo(raw.tempo_bpm),
        ])
    }

    /// Normalize a full track record, passing display metadata through
    /// untouched.
    pub fn normalize_track(&self, raw: &RawTrack) -> Track {
        Track {
            id: raw.id.clone(),
            name: raw.name.clone(),
            artist: raw.artist.clone(),
            album: raw.album.clone(),
            features: self.normalize(&raw.features),
        }
    }

    /// Map raw BPM into [0,1]: `(bpm - min) / (max - min)`, clamped.
    pub fn normalize_tempo(&self, bpm: f64) -> f64 {
        let span = (self.tempo.max_bpm - self.tempo.min_bpm).max(1e-9);
        ((bpm - self.tempo.min_bpm) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{idx, DIMENSIONS};

    fn raw(tempo_bpm: f64) -> RawTrackFeatures {
        RawTrackFeatures {
            danceability: 0.5,
            energy: 0.6,
            valence: 0.7,
            acousticness: 0.2,
            instrumentalness: 0.1,
            liveness: 0.15,
            speechiness: 0.05,
            tempo_bpm,
        }
    }

    #[test]
    fn test_vector_has_fixed_dimension_order() {
        let v = Normalizer::default().normalize(&raw(125.0));
        assert_eq!(v.len(), DIMENSIONS);
        assert_eq!(v.values()[idx::DANCEABILITY], 0.5);
        assert_eq!(v.values()[idx::ENERGY], 0.6);
        assert_eq!(v.values()[idx::VALENCE], 0.7);
        assert_eq!(v.values()[idx::SPEECHINESS], 0.05);
    }

    #[test]
    fn test_tempo_maps_linearly() {
        let n = Normalizer::default();
        // Midpoint of 50-200 is 125
        assert!((n.normalize_tempo(125.0) - 0.5).abs() < 1e-12);
        assert!((n.normalize_tempo(50.0) - 0.0).abs() < 1e-12);
        assert!((n.normalize_tempo(200.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tempo_clamps_at_bounds() {
        let n = Normalizer::default();
        assert_eq!(n.normalize_tempo(30.0), 0.0);
        assert_eq!(n.normalize_tempo(260.0), 1.0);
    }

    #[test]
    fn test_custom_tempo_range() {
        let n = Normalizer::new(TempoRange {
            min_bpm: 100.0,
            max_bpm: 150.0,
        });
        assert!((n.normalize_tempo(125.0) - 0.5).abs() < 1e-12);
        assert_eq!(n.normalize_tempo(90.0), 0.0);
    }

    #[test]
    fn test_out_of_range_bounded_features_are_clamped() {
        let mut r = raw(120.0);
        r.energy = 1.4; // upstream bug
        r.valence = -0.2;
        let v = Normalizer::default().normalize(&r);
        assert_eq!(v.values()[idx::ENERGY], 1.0);
        assert_eq!(v.values()[idx::VALENCE], 0.0);
        // Other fields unaffected
        assert_eq!(v.values()[idx::DANCEABILITY], 0.5);
    }

    #[test]
    fn test_normalize_track_passes_metadata_through() {
        let raw_track = RawTrack {
            id: "id1".into(),
            name: "St. Stephen".into(),
            artist: "Grateful Dead".into(),
            album: "Aoxomoxoa".into(),
            features: raw(110.0),
        };
        let track = Normalizer::default().normalize_track(&raw_track);
        assert_eq!(track.id, "id1");
        assert_eq!(track.name, "St. Stephen");
        assert_eq!(track.album, "Aoxomoxoa");
        assert_eq!(track.features.len(), DIMENSIONS);
    }
}
