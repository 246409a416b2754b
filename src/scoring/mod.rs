//! Reduction of pitch and band-energy features to bounded scores.

pub mod combine;
pub mod melody;
pub mod tonal;

use serde::Serialize;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Final scores for one excerpt, each in [0, 100] with two decimals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub melody_score: f64,
    pub tonal_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<f64>,
}

impl ScoreRecord {
    pub fn new(melody: f64, tonal: f64, combined: Option<f64>) -> Self {
        Self {
            melody_score: finalize(melody),
            tonal_score: finalize(tonal),
            combined_score: combined.map(finalize),
        }
    }
}

pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

fn finalize(value: f64) -> f64 {
    (clamp_score(value) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_rounds_and_clamps() {
        let record = ScoreRecord::new(42.126, 140.0, Some(-3.0));
        assert_eq!(record.melody_score, 42.13);
        assert_eq!(record.tonal_score, 100.0);
        assert_eq!(record.combined_score, Some(0.0));
    }

    #[test]
    fn nan_scores_become_zero() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn combined_is_omitted_when_absent() {
        let json = serde_json::to_value(ScoreRecord::new(10.0, 20.0, None)).unwrap();
        assert_eq!(json, serde_json::json!({ "melody_score": 10.0, "tonal_score": 20.0 }));
    }
}
