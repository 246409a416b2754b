use serde::Serialize;

use super::clamp_score;
use crate::audio::features::F0Contour;
use crate::config::MelodyConfig;

/// Floor for the mean F0 when dividing
const MEAN_FLOOR: f64 = 1e-6;

/// Statistics over the voiced part of a contour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PitchStats {
    pub voiced_frames: usize,
    pub mean_f0: f64,
    /// Population standard deviation
    pub std_f0: f64,
    pub cv: f64,
}

impl PitchStats {
    /// `None` when the contour has no voiced frames.
    pub fn from_contour(contour: &F0Contour) -> Option<Self> {
        let voiced: Vec<f64> = contour.voiced_frequencies().map(f64::from).collect();
        if voiced.is_empty() {
            return None;
        }

        let n = voiced.len() as f64;
        let mean = voiced.iter().sum::<f64>() / n;
        let variance = voiced.iter().map(|f| (f - mean) * (f - mean)).sum::<f64>() / n;
        let std = variance.sqrt();

        Some(Self {
            voiced_frames: voiced.len(),
            mean_f0: mean,
            std_f0: std,
            cv: std / mean.max(MEAN_FLOOR),
        })
    }
}

/// Pitch variability score: `cv / max_cv * 100`, clamped to [0, 100].
pub fn melody_score(stats: Option<&PitchStats>, config: &MelodyConfig) -> f64 {
    match stats {
        Some(stats) => clamp_score(stats.cv / config.max_cv * 100.0),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::PitchEstimate;

    fn contour(freqs: &[Option<f32>]) -> F0Contour {
        freqs
            .iter()
            .map(|f| match f {
                Some(hz) => PitchEstimate::voiced(*hz),
                None => PitchEstimate::unvoiced(),
            })
            .collect()
    }

    fn config(max_cv: f64) -> MelodyConfig {
        MelodyConfig { max_cv }
    }

    #[test]
    fn no_voiced_frames_scores_zero() {
        let c = contour(&[None, None, None]);
        let stats = PitchStats::from_contour(&c);
        assert!(stats.is_none());
        assert_eq!(melody_score(stats.as_ref(), &config(0.35)), 0.0);
        assert_eq!(melody_score(None, &config(0.35)), 0.0);
    }

    #[test]
    fn constant_pitch_scores_zero() {
        let c = contour(&[Some(180.0); 10]);
        let stats = PitchStats::from_contour(&c).unwrap();
        assert_eq!(stats.std_f0, 0.0);
        assert_eq!(melody_score(Some(&stats), &config(0.35)), 0.0);
    }

    #[test]
    fn unvoiced_frames_are_ignored() {
        let c = contour(&[Some(100.0), None, Some(300.0), None]);
        let stats = PitchStats::from_contour(&c).unwrap();
        assert_eq!(stats.voiced_frames, 2);
        assert_eq!(stats.mean_f0, 200.0);
        assert_eq!(stats.std_f0, 100.0);
        assert_eq!(stats.cv, 0.5);
    }

    #[test]
    fn cv_at_max_cv_saturates() {
        let c = contour(&[Some(100.0), Some(300.0)]);
        let stats = PitchStats::from_contour(&c).unwrap();
        assert_eq!(melody_score(Some(&stats), &config(0.5)), 100.0);
        // beyond max_cv stays clamped
        assert_eq!(melody_score(Some(&stats), &config(0.35)), 100.0);
    }

    #[test]
    fn score_is_linear_below_saturation() {
        let c = contour(&[Some(100.0), Some(300.0)]);
        let stats = PitchStats::from_contour(&c).unwrap();
        assert!((melody_score(Some(&stats), &config(1.0)) - 50.0).abs() < 1e-12);
    }
}
