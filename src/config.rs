use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Top-level `prosody.toml` contents.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(flatten)]
    pub scoring: ScoringConfig,
}

/// Which part of the decoded file gets scored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SegmentConfig {
    #[serde(default)]
    pub start_seconds: f64,
    #[serde(default = "default_duration")]
    pub duration_seconds: f64,
}

/// Every calibration constant the engine uses, in one place.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub pitch: PitchConfig,
    #[serde(default)]
    pub melody: MelodyConfig,
    #[serde(default)]
    pub bands: BandConfig,
    #[serde(default)]
    pub tonal: TonalStrategy,
    #[serde(default)]
    pub combine: CombineConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Rate the adapter resamples to before scoring
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_frame_length")]
    pub frame_length: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PitchConfig {
    /// Lowest trackable F0 (C2)
    #[serde(default = "default_fmin")]
    pub fmin: f32,
    /// Highest trackable F0 (C7)
    #[serde(default = "default_fmax")]
    pub fmax: f32,
    /// YIN absolute threshold on the normalized difference
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MelodyConfig {
    /// Coefficient of variation that maps to a score of 100
    #[serde(default = "default_max_cv")]
    pub max_cv: f64,
}

/// Band edges in Hz. Every band is half-open `[lo, hi)`; the mid band ends
/// where the high band starts. A high edge at or above Nyquist ends the
/// high band at the Nyquist bin, inclusive.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BandConfig {
    #[serde(default = "default_low_min")]
    pub low_min_hz: f32,
    #[serde(default = "default_low_max")]
    pub low_max_hz: f32,
    #[serde(default = "default_mid_min")]
    pub mid_min_hz: f32,
    #[serde(default = "default_high_min")]
    pub high_min_hz: f32,
    #[serde(default = "default_high_max")]
    pub high_max_hz: f32,
}

/// Tonal axis formula. Older formulas stay selectable so their scores can
/// be reproduced.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum TonalStrategy {
    /// Decibel level of `high_mean + mid_weight * mid_mean`, rescaled
    /// from `[min_db, max_db]`.
    BandEnergy {
        #[serde(default = "default_mid_weight")]
        mid_weight: f64,
        #[serde(default = "default_min_db")]
        min_db: f64,
        #[serde(default = "default_max_db")]
        max_db: f64,
    },
    /// Closeness of the mean voiced F0 to a target pitch.
    TargetDistance {
        #[serde(default = "default_target_f0")]
        target_f0: f64,
    },
    /// Share of high-band energy in `high + low` total energy.
    BandRatio,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CombineConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_weight")]
    pub weight_melody: f64,
    #[serde(default = "default_weight")]
    pub weight_tonal: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            start_seconds: 0.0,
            duration_seconds: default_duration(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            frame_length: default_frame_length(),
            hop_length: default_hop_length(),
        }
    }
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin: default_fmin(),
            fmax: default_fmax(),
            threshold: default_threshold(),
        }
    }
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            max_cv: default_max_cv(),
        }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            low_min_hz: default_low_min(),
            low_max_hz: default_low_max(),
            mid_min_hz: default_mid_min(),
            high_min_hz: default_high_min(),
            high_max_hz: default_high_max(),
        }
    }
}

impl Default for TonalStrategy {
    fn default() -> Self {
        Self::band_energy()
    }
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight_melody: default_weight(),
            weight_tonal: default_weight(),
        }
    }
}

impl TonalStrategy {
    pub fn band_energy() -> Self {
        Self::BandEnergy {
            mid_weight: default_mid_weight(),
            min_db: default_min_db(),
            max_db: default_max_db(),
        }
    }

    pub fn target_distance() -> Self {
        Self::TargetDistance {
            target_f0: default_target_f0(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BandEnergy { .. } => "band_energy",
            Self::TargetDistance { .. } => "target_distance",
            Self::BandRatio => "band_ratio",
        }
    }
}

impl BandConfig {
    pub fn exceeds_nyquist(&self, sample_rate: u32) -> bool {
        self.high_max_hz > sample_rate as f32 / 2.0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_band("low", self.low_min_hz, self.low_max_hz)?;
        check_band("mid", self.mid_min_hz, self.high_min_hz)?;
        check_band("high", self.high_min_hz, self.high_max_hz)
    }
}

fn check_band(band: &'static str, lo: f32, hi: f32) -> Result<(), ConfigError> {
    if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || lo >= hi {
        return Err(ConfigError::InvalidBand { band, lo, hi });
    }
    Ok(())
}

fn check_weight(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidWeight { name, value });
    }
    Ok(())
}

impl ScoringConfig {
    /// Nyquist frequency of the analysis rate
    pub fn nyquist(&self) -> f32 {
        self.analysis.sample_rate as f32 / 2.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let AnalysisConfig {
            sample_rate,
            frame_length,
            hop_length,
        } = self.analysis;
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if frame_length == 0 || hop_length == 0 {
            return Err(ConfigError::ZeroFrameGeometry {
                frame: frame_length,
                hop: hop_length,
            });
        }

        let PitchConfig {
            fmin,
            fmax,
            threshold,
        } = self.pitch;
        if !fmin.is_finite() || !fmax.is_finite() || fmin <= 0.0 || fmin >= fmax {
            return Err(ConfigError::InvalidPitchRange { fmin, fmax });
        }
        if fmax > self.nyquist() {
            return Err(ConfigError::PitchAboveNyquist {
                fmax,
                nyquist: self.nyquist(),
            });
        }
        let needed = 2 * (sample_rate as f32 / fmin).ceil() as usize + 2;
        if frame_length < needed {
            return Err(ConfigError::FrameTooShort {
                frame: frame_length,
                fmin,
                sample_rate,
                needed,
            });
        }
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        if !(self.melody.max_cv > 0.0 && self.melody.max_cv.is_finite()) {
            return Err(ConfigError::NonPositiveMaxCv(self.melody.max_cv));
        }

        self.bands.validate()?;

        match self.tonal {
            TonalStrategy::BandEnergy {
                mid_weight,
                min_db,
                max_db,
            } => {
                if !mid_weight.is_finite() || mid_weight < 0.0 {
                    return Err(ConfigError::InvalidMidWeight(mid_weight));
                }
                if !min_db.is_finite() || !max_db.is_finite() || min_db >= max_db {
                    return Err(ConfigError::InvertedDbWindow { min_db, max_db });
                }
            }
            TonalStrategy::TargetDistance { target_f0 } => {
                if !(target_f0 > 0.0 && target_f0.is_finite()) {
                    return Err(ConfigError::NonPositiveTarget(target_f0));
                }
            }
            TonalStrategy::BandRatio => {}
        }

        check_weight("melody", self.combine.weight_melody)?;
        check_weight("tonal", self.combine.weight_tonal)?;

        Ok(())
    }
}

fn default_duration() -> f64 { 60.0 }
fn default_sample_rate() -> u32 { 22050 }
fn default_frame_length() -> usize { 2048 }
fn default_hop_length() -> usize { 512 }
fn default_fmin() -> f32 { 65.41 }
fn default_fmax() -> f32 { 2093.0 }
fn default_threshold() -> f32 { 0.1 }
fn default_max_cv() -> f64 { 0.35 }
fn default_low_min() -> f32 { 1.0 }
fn default_low_max() -> f32 { 70.0 }
fn default_mid_min() -> f32 { 2000.0 }
fn default_high_min() -> f32 { 6000.0 }
fn default_high_max() -> f32 { 11025.0 }
fn default_mid_weight() -> f64 { 0.5 }
fn default_min_db() -> f64 { 0.0 }
fn default_max_db() -> f64 { 20.0 }
fn default_target_f0() -> f64 { 180.0 }
fn default_true() -> bool { true }
fn default_weight() -> f64 { 0.5 }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Look for `prosody.toml` in the working directory, then the per-user
/// config locations.
pub fn discover_config_path() -> Option<PathBuf> {
    let local = PathBuf::from("prosody.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("prosody").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("prosody").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
