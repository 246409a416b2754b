use serde::Serialize;

use super::decode::AudioBuffer;
use super::features::BandEnergy;
use super::frames::FrameSegmenter;
use super::pitch::{PitchTracker, YinTracker};
use super::spectrum::SpectrumAnalyzer;
use crate::config::ScoringConfig;
use crate::error::ConfigError;
use crate::scoring::combine::combine;
use crate::scoring::melody::{melody_score, PitchStats};
use crate::scoring::tonal::tonal_score;
use crate::scoring::ScoreRecord;

/// Intermediate values behind a [`ScoreRecord`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub frames: usize,
    pub voiced_frames: usize,
    pub pitch: Option<PitchStats>,
    pub bands: BandEnergy,
    /// High band was cut at Nyquist for this buffer's sample rate
    pub bands_clipped: bool,
    pub strategy: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    pub record: ScoreRecord,
    pub diagnostics: Diagnostics,
}

/// Scores mono buffers against one validated calibration.
///
/// The engine holds no per-call state; a single instance can be shared
/// across threads and fed any number of buffers.
pub struct ScoringEngine<T: PitchTracker = YinTracker> {
    config: ScoringConfig,
    segmenter: FrameSegmenter,
    spectrum: SpectrumAnalyzer,
    tracker: T,
}

impl ScoringEngine<YinTracker> {
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        let tracker = YinTracker::from_config(&config.pitch);
        Self::with_tracker(config, tracker)
    }
}

impl<T: PitchTracker> ScoringEngine<T> {
    /// Build an engine around a custom pitch estimator.
    pub fn with_tracker(config: ScoringConfig, tracker: T) -> Result<Self, ConfigError> {
        config.validate()?;

        let analysis = &config.analysis;
        if config.bands.exceeds_nyquist(analysis.sample_rate) {
            log::warn!(
                "High band upper edge {:.0} Hz exceeds Nyquist ({:.0} Hz at {} Hz); \
                 the band is clipped at Nyquist and should be recalibrated",
                config.bands.high_max_hz,
                config.nyquist(),
                analysis.sample_rate
            );
        }

        log::info!(
            "Scoring engine: {} Hz, frame={}, hop={}, pitch {:.1}-{:.1} Hz, max_cv={}, tonal={}",
            analysis.sample_rate,
            analysis.frame_length,
            analysis.hop_length,
            config.pitch.fmin,
            config.pitch.fmax,
            config.melody.max_cv,
            config.tonal.name()
        );

        Ok(Self {
            segmenter: FrameSegmenter::new(analysis.frame_length, analysis.hop_length),
            spectrum: SpectrumAnalyzer::new(analysis.frame_length),
            tracker,
            config,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, buffer: &AudioBuffer) -> ScoreRecord {
        self.analyze(buffer).record
    }

    pub fn analyze(&self, buffer: &AudioBuffer) -> Analysis {
        let strategy = self.config.tonal.name();
        if buffer.is_empty() {
            log::debug!("Empty buffer, all scores are 0");
            return Analysis {
                record: ScoreRecord::new(0.0, 0.0, combine(0.0, 0.0, &self.config.combine)),
                diagnostics: Diagnostics {
                    strategy,
                    ..Diagnostics::default()
                },
            };
        }

        let sample_rate = buffer.sample_rate();
        if sample_rate != self.config.analysis.sample_rate {
            log::warn!(
                "Buffer is {} Hz but the engine is calibrated for {} Hz",
                sample_rate,
                self.config.analysis.sample_rate
            );
        }
        let samples = buffer.samples();

        let contour = self.tracker.track(samples, sample_rate, &self.segmenter);
        let pitch = PitchStats::from_contour(&contour);
        let bands = self
            .spectrum
            .band_energy(samples, sample_rate, &self.segmenter, &self.config.bands);

        let melody = melody_score(pitch.as_ref(), &self.config.melody);
        let tonal = tonal_score(&self.config.tonal, &bands, pitch.as_ref());
        let combined = combine(melody, tonal, &self.config.combine);
        let record = ScoreRecord::new(melody, tonal, combined);

        log::debug!(
            "{} frames ({} voiced), melody={:.2}, tonal={:.2}",
            contour.len(),
            contour.voiced_count(),
            record.melody_score,
            record.tonal_score
        );

        Analysis {
            record,
            diagnostics: Diagnostics {
                frames: contour.len(),
                voiced_frames: contour.voiced_count(),
                pitch,
                bands,
                bands_clipped: self.config.bands.exceeds_nyquist(sample_rate),
                strategy,
            },
        }
    }
}
