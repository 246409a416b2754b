use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use prosody::TonalStrategy;

#[derive(Parser, Debug)]
#[command(name = "prosody", about = "Melody and tonal scoring for short audio excerpts")]
pub struct Cli {
    /// Audio files to score (WAV, MP3, FLAC, OGG)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file (defaults to prosody.toml or the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Segment start in seconds
    #[arg(short, long)]
    pub start: Option<f64>,

    /// Segment length in seconds
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Tonal scoring formula
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Coefficient of variation that maps to a melody score of 100
    #[arg(long)]
    pub max_cv: Option<f64>,

    /// Melody weight in the combined score
    #[arg(long, env = "WEIGHT_MELODY")]
    pub weight_melody: Option<f64>,

    /// Tonal weight in the combined score (WEIGHT_FREQUENCY is read when
    /// WEIGHT_TONAL is unset)
    #[arg(long, alias = "weight-frequency", env = "WEIGHT_TONAL")]
    pub weight_tonal: Option<f64>,

    /// Only report the melody and tonal axes
    #[arg(long)]
    pub no_combined: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Include pitch and band-energy details
    #[arg(long)]
    pub diagnostics: bool,

    /// Worker threads for batch scoring (defaults to one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    BandEnergy,
    TargetDistance,
    BandRatio,
}

impl StrategyArg {
    /// Switch `current` to this formula, keeping its parameters when the
    /// formula is unchanged.
    pub fn apply(self, current: &TonalStrategy) -> TonalStrategy {
        match (self, current) {
            (Self::BandEnergy, TonalStrategy::BandEnergy { .. })
            | (Self::TargetDistance, TonalStrategy::TargetDistance { .. })
            | (Self::BandRatio, TonalStrategy::BandRatio) => current.clone(),
            (Self::BandEnergy, _) => TonalStrategy::band_energy(),
            (Self::TargetDistance, _) => TonalStrategy::target_distance(),
            (Self::BandRatio, _) => TonalStrategy::BandRatio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_batch_arguments() {
        let cli = Cli::try_parse_from([
            "prosody",
            "a.mp3",
            "b.wav",
            "--start",
            "600",
            "--strategy",
            "target-distance",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.start, Some(600.0));
        assert_eq!(cli.strategy, Some(StrategyArg::TargetDistance));
        assert!(cli.json);
        assert!(!cli.no_combined);
    }

    #[test]
    fn weight_frequency_flag_sets_tonal_weight() {
        let cli = Cli::try_parse_from(["prosody", "a.mp3", "--weight-frequency", "0.25"]).unwrap();
        assert_eq!(cli.weight_tonal, Some(0.25));
    }

    #[test]
    fn requires_an_input() {
        assert!(Cli::try_parse_from(["prosody"]).is_err());
    }

    #[test]
    fn strategy_keeps_matching_parameters() {
        let tuned = TonalStrategy::BandEnergy {
            mid_weight: 0.2,
            min_db: -10.0,
            max_db: 5.0,
        };
        assert_eq!(StrategyArg::BandEnergy.apply(&tuned), tuned);
        assert_eq!(StrategyArg::BandRatio.apply(&tuned), TonalStrategy::BandRatio);
        assert_eq!(
            StrategyArg::TargetDistance.apply(&tuned),
            TonalStrategy::target_distance()
        );
    }
}
