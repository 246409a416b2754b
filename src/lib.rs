//! Melody and tonal scoring for short audio excerpts.
//!
//! The engine consumes a decoded mono [`AudioBuffer`] and returns a
//! [`ScoreRecord`] with a pitch-variability ("melody") score, a spectral
//! brightness ("tonal") score and an optional weighted blend of the two.

pub mod audio;
pub mod config;
pub mod error;
pub mod scoring;

pub use audio::analysis::{Analysis, Diagnostics, ScoringEngine};
pub use audio::decode::{decode_audio, AudioBuffer};
pub use audio::pitch::{PitchTracker, YinTracker};
pub use config::{Config, ScoringConfig, TonalStrategy};
pub use error::ConfigError;
pub use scoring::ScoreRecord;
