use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::model::DIMENSIONS;

/// BPM range used to map raw tempo into [0,1].
/// The 50–200 default spans typical popular-music tempos.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TempoRange {
    pub min_bpm: f64,
    pub max_bpm: f64,
}

impl Default for TempoRange {
    fn default() -> Self {
        Self {
            min_bpm: 50.0,
            max_bpm: 200.0,
        }
    }
}

/// Per-dimension importance weights for the weighted and feature_based
/// methods. Defaults favor energy and valence (mood matters most).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub speechiness: f64,
    pub tempo_normalized: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            danceability: 1.0,
            energy: 1.5,
            valence: 1.5,
            acousticness: 1.0,
            instrumentalness: 0.8,
            liveness: 0.6,
            speechiness: 0.6,
            tempo_normalized: 1.0,
        }
    }
}

impl FeatureWeights {
    /// Weights as an array in vector dimension order.
    pub fn as_array(&self) -> [f64; DIMENSIONS] {
        [
            self.danceability,
            self.energy,
            self.valence,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.speechiness,
            self.tempo_normalized,
        ]
    }
}

/// How the feature_based method blends its four sub-scores.
/// The defaults sum to 1.0.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub overall: f64,
    pub mood: f64,
    pub style: f64,
    pub tempo: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            overall: 0.4,
            mood: 0.3,
            style: 0.2,
            tempo: 0.1,
        }
    }
}

/// Engine tuning: tempo range plus weight tables. An explicit value owned by
/// each engine instance, so differently-tuned engines can run side by side.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tempo: TempoRange,
    pub weights: FeatureWeights,
    pub blend: BlendWeights,
}

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Default scoring method when the CLI doesn't specify one.
    pub default_method: Option<String>,
    /// Default result limit. 0 = engine default.
    pub default_limit: usize,
    /// Engine tuning (tempo range, weight tables).
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load config from `~/.config/reprise/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve result limit: 0 → engine default.
    pub fn resolve_limit(&self) -> usize {
        if self.default_limit > 0 {
            self.default_limit
        } else {
            crate::engine::DEFAULT_LIMIT
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
