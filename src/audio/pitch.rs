use super::features::{F0Contour, PitchEstimate};
use super::frames::FrameSegmenter;
use crate::config::PitchConfig;

/// Monophonic F0 estimation, one frame at a time.
///
/// Implementations must only report frequencies inside their configured
/// range and must mark frames without a usable period as unvoiced.
pub trait PitchTracker: Send + Sync {
    fn estimate(&self, frame: &[f32], sample_rate: u32) -> PitchEstimate;

    fn track(&self, samples: &[f32], sample_rate: u32, segmenter: &FrameSegmenter) -> F0Contour {
        segmenter
            .frames(samples.len())
            .iter()
            .map(|frame| self.estimate(&segmenter.samples(samples, frame), sample_rate))
            .collect()
    }
}

/// YIN estimator (de Cheveigné & Kawahara, 2002).
#[derive(Clone, Debug)]
pub struct YinTracker {
    fmin: f32,
    fmax: f32,
    threshold: f32,
}

impl YinTracker {
    pub fn new(fmin: f32, fmax: f32, threshold: f32) -> Self {
        Self {
            fmin,
            fmax,
            threshold,
        }
    }

    pub fn from_config(config: &PitchConfig) -> Self {
        Self::new(config.fmin, config.fmax, config.threshold)
    }

    /// Cumulative mean normalized difference for lags `0..=max_lag`.
    ///
    /// Every lag is summed over the same `window` samples so the values
    /// stay comparable across lags.
    fn normalized_difference(frame: &[f32], window: usize, max_lag: usize) -> Vec<f64> {
        let mut cmnd = vec![1.0f64; max_lag + 1];
        let mut running = 0.0f64;
        for tau in 1..=max_lag {
            let diff: f64 = frame[..window]
                .iter()
                .zip(&frame[tau..tau + window])
                .map(|(&a, &b)| {
                    let d = a as f64 - b as f64;
                    d * d
                })
                .sum();
            running += diff;
            cmnd[tau] = if running > 0.0 {
                diff * tau as f64 / running
            } else {
                1.0
            };
        }
        cmnd
    }
}

impl Default for YinTracker {
    fn default() -> Self {
        Self::from_config(&PitchConfig::default())
    }
}

impl PitchTracker for YinTracker {
    fn track(&self, samples: &[f32], sample_rate: u32, segmenter: &FrameSegmenter) -> F0Contour {
        let longest_lag = (segmenter.frame_length() / 2).saturating_sub(1).max(1);
        let lowest = sample_rate as f32 / longest_lag as f32;
        if lowest > self.fmin {
            log::debug!(
                "{}-sample frames at {} Hz only reach down to {:.1} Hz (configured {:.1} Hz)",
                segmenter.frame_length(),
                sample_rate,
                lowest,
                self.fmin
            );
        }
        segmenter
            .frames(samples.len())
            .iter()
            .map(|frame| self.estimate(&segmenter.samples(samples, frame), sample_rate))
            .collect()
    }

    fn estimate(&self, frame: &[f32], sample_rate: u32) -> PitchEstimate {
        let sr = sample_rate as f64;
        let min_tau = ((sr / self.fmax as f64).floor() as usize).max(2);
        // One extra lag past max_tau for the minimum search and interpolation,
        // so the longest lag a frame supports is len/2 - 1
        let max_tau = (sr / self.fmin as f64)
            .ceil()
            .min((frame.len() / 2).saturating_sub(1) as f64) as usize;
        if min_tau >= max_tau {
            return PitchEstimate::unvoiced();
        }
        let window = frame.len() - max_tau - 1;
        let cmnd = Self::normalized_difference(frame, window, max_tau + 1);

        let threshold = self.threshold as f64;
        let Some(mut tau) = (min_tau..=max_tau).find(|&t| cmnd[t] < threshold) else {
            return PitchEstimate::unvoiced();
        };
        while tau < max_tau && cmnd[tau + 1] < cmnd[tau] {
            tau += 1;
        }

        let (a, b, c) = (cmnd[tau - 1], cmnd[tau], cmnd[tau + 1]);
        let denom = a - 2.0 * b + c;
        let offset = if denom.abs() > 1e-12 {
            ((a - c) / (2.0 * denom)).clamp(-1.0, 1.0)
        } else {
            0.0
        };

        let f0 = (sr / (tau as f64 + offset)) as f32;
        if f0 < self.fmin || f0 > self.fmax {
            return PitchEstimate::unvoiced();
        }
        PitchEstimate::voiced(f0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_signals::{sine, SR};

    fn frame_of(freq: f32, amplitude: f32) -> Vec<f32> {
        sine(freq, amplitude, 0.5)[..2048].to_vec()
    }

    #[test]
    fn detects_sine_frequency() {
        let yin = YinTracker::default();
        for freq in [110.0f32, 180.0, 440.0, 1000.0] {
            let est = yin.estimate(&frame_of(freq, 0.5), SR);
            assert!(est.voiced, "{} Hz should be voiced", freq);
            let f0 = est.frequency.unwrap();
            assert!(
                (f0 - freq).abs() / freq < 0.01,
                "expected ~{} Hz, got {}",
                freq,
                f0
            );
        }
    }

    #[test]
    fn silence_is_unvoiced() {
        let yin = YinTracker::default();
        let est = yin.estimate(&vec![0.0; 2048], SR);
        assert_eq!(est, PitchEstimate::unvoiced());
    }

    #[test]
    fn out_of_range_pitch_is_unvoiced() {
        // 40 Hz sits below the C2 floor
        let yin = YinTracker::default();
        let est = yin.estimate(&frame_of(40.0, 0.5), SR);
        assert!(!est.voiced);
    }

    #[test]
    fn estimate_ignores_gain() {
        let yin = YinTracker::default();
        let loud = frame_of(220.0, 0.8);
        let quiet: Vec<f32> = loud.iter().map(|s| s * 0.25).collect();
        assert_eq!(yin.estimate(&loud, SR), yin.estimate(&quiet, SR));
    }

    #[test]
    fn short_frame_limits_lowest_pitch() {
        let yin = YinTracker::default();
        // 256 samples reach lags up to 127, i.e. ~174 Hz at 22050 Hz
        let est = yin.estimate(&frame_of(110.0, 0.5)[..256], SR);
        assert!(!est.voiced);

        let est = yin.estimate(&frame_of(440.0, 0.5)[..256], SR);
        let f0 = est.frequency.expect("440 Hz fits in a 256-sample frame");
        assert!((f0 - 440.0).abs() / 440.0 < 0.01, "got {}", f0);
    }

    #[test]
    fn high_sample_rate_frames_stay_voiced() {
        let yin = YinTracker::default();
        let sr = 96_000u32;
        let frame: Vec<f32> = (0..2048)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 180.0 * i as f32 / sr as f32).sin())
            .collect();
        let f0 = yin.estimate(&frame, sr).frequency.expect("180 Hz at 96 kHz should be voiced");
        assert!((f0 - 180.0).abs() / 180.0 < 0.01, "got {}", f0);
    }

    #[test]
    fn track_aligns_with_frames() {
        let yin = YinTracker::default();
        let seg = FrameSegmenter::new(2048, 512);
        let samples = sine(220.0, 0.5, 1.0);
        let contour = yin.track(&samples, SR, &seg);
        assert_eq!(contour.len(), seg.frames(samples.len()).len());
        assert_eq!(contour.voiced_count(), contour.len());
    }
}
