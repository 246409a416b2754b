use super::melody::PitchStats;
use super::{clamp_score, SCORE_MAX};
use crate::audio::features::BandEnergy;
use crate::config::TonalStrategy;

/// Added to the energy before taking the logarithm
const DB_EPSILON: f64 = 1e-9;

/// Secondary-axis score for whichever formula the strategy selects.
pub fn tonal_score(strategy: &TonalStrategy, energy: &BandEnergy, pitch: Option<&PitchStats>) -> f64 {
    match *strategy {
        TonalStrategy::BandEnergy {
            mid_weight,
            min_db,
            max_db,
        } => band_energy_score(energy, mid_weight, min_db, max_db),
        TonalStrategy::TargetDistance { target_f0 } => match pitch {
            Some(stats) => target_distance_score(stats.mean_f0, target_f0),
            None => 0.0,
        },
        TonalStrategy::BandRatio => band_ratio_score(energy),
    }
}

pub fn band_energy_score(energy: &BandEnergy, mid_weight: f64, min_db: f64, max_db: f64) -> f64 {
    let weighted = energy.high_mean + mid_weight * energy.mid_mean;
    if !(weighted > 0.0) {
        return 0.0;
    }
    let db = 10.0 * (weighted + DB_EPSILON).log10();
    clamp_score((db - min_db) / (max_db - min_db) * SCORE_MAX)
}

pub fn target_distance_score(mean_f0: f64, target_f0: f64) -> f64 {
    let distance = (mean_f0 - target_f0).abs() / target_f0;
    clamp_score(SCORE_MAX - distance * SCORE_MAX)
}

pub fn band_ratio_score(energy: &BandEnergy) -> f64 {
    let high = energy.high_total();
    let total = high + energy.low_sum;
    if !(total > 0.0) {
        return 0.0;
    }
    clamp_score(high / total * SCORE_MAX)
}
