mod batch;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use batch::{score_files, BatchReport, Segment};
use cli::Cli;
use prosody::config::{self, Config};
use prosody::ScoringEngine;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Explicit --config path, or auto-detect prosody.toml / user config
    let config_path = cli.config.clone().or_else(config::discover_config_path);
    let mut cfg = match config_path {
        Some(ref path) => {
            let cfg = config::load_config(path)?;
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        None => Config::default(),
    };
    let legacy_tonal = parse_weight("WEIGHT_FREQUENCY", std::env::var("WEIGHT_FREQUENCY").ok())?;
    apply_overrides(&cli, legacy_tonal, &mut cfg);

    if let Some(jobs) = cli.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let engine = ScoringEngine::new(cfg.scoring).context("Invalid scoring configuration")?;
    let segment = Segment {
        start_seconds: cfg.segment.start_seconds,
        duration_seconds: cfg.segment.duration_seconds,
    };

    log::info!(
        "Scoring {} file(s), segment {:.1}s + {:.1}s",
        cli.inputs.len(),
        segment.start_seconds,
        segment.duration_seconds
    );

    let show_progress = !cli.json && cli.inputs.len() > 1;
    let report = score_files(&engine, &cli.inputs, segment, cli.diagnostics, show_progress)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.errors.is_empty() {
        anyhow::bail!(
            "{} of {} file(s) could not be scored",
            report.errors.len(),
            cli.inputs.len()
        );
    }
    Ok(())
}

/// Parse a weight taken from an environment variable outside clap.
fn parse_weight(name: &str, raw: Option<String>) -> Result<Option<f64>> {
    raw.map(|value| {
        value
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{} is not a number: {:?}", name, value))
    })
    .transpose()
}

/// Command-line values win over the config file. `legacy_tonal` is the
/// older WEIGHT_FREQUENCY name and only applies when `--weight-tonal` /
/// WEIGHT_TONAL is absent.
fn apply_overrides(cli: &Cli, legacy_tonal: Option<f64>, cfg: &mut Config) {
    if let Some(start) = cli.start {
        cfg.segment.start_seconds = start;
    }
    if let Some(duration) = cli.duration {
        cfg.segment.duration_seconds = duration;
    }

    let scoring = &mut cfg.scoring;
    if let Some(strategy) = cli.strategy {
        scoring.tonal = strategy.apply(&scoring.tonal);
    }
    if let Some(max_cv) = cli.max_cv {
        scoring.melody.max_cv = max_cv;
    }
    if let Some(weight) = cli.weight_melody {
        scoring.combine.weight_melody = weight;
    }
    if let Some(weight) = cli.weight_tonal.or(legacy_tonal) {
        scoring.combine.weight_tonal = weight;
    }
    if cli.no_combined {
        scoring.combine.enabled = false;
    }
}

fn print_report(report: &BatchReport) {
    for score in &report.results {
        let name = std::path::Path::new(&score.file)
            .file_name()
            .map_or_else(|| score.file.clone(), |n| n.to_string_lossy().into_owned());
        let record = &score.record;
        let mut line = format!(
            "{} [{:.0}s-{:.0}s]: melody={:.2} tonal={:.2}",
            name, score.start_seconds, score.end_seconds, record.melody_score, record.tonal_score
        );
        if let Some(combined) = record.combined_score {
            line.push_str(&format!(" combined={:.2}", combined));
        }
        println!("{}", line);

        if let Some(ref diag) = score.diagnostics {
            let (mean, std) = diag
                .pitch
                .map_or((0.0, 0.0), |p| (p.mean_f0, p.std_f0));
            println!(
                "    frames={} voiced={} mean_f0={:.1}Hz std_f0={:.1}Hz",
                diag.frames, diag.voiced_frames, mean, std
            );
            println!(
                "    {} high={:.2e} mid={:.2e} low={:.2e}{}",
                diag.strategy,
                diag.bands.high_mean,
                diag.bands.mid_mean,
                diag.bands.low_sum,
                if diag.bands_clipped { " (high band clipped at Nyquist)" } else { "" }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosody::TonalStrategy;

    #[test]
    fn cli_overrides_config_values() {
        let cli = Cli::try_parse_from([
            "prosody",
            "clip.mp3",
            "--start",
            "600",
            "--max-cv",
            "0.6",
            "--weight-melody",
            "0.8",
            "--strategy",
            "band-ratio",
            "--no-combined",
        ])
        .unwrap();
        let mut cfg = Config::default();
        apply_overrides(&cli, None, &mut cfg);

        assert_eq!(cfg.segment.start_seconds, 600.0);
        assert_eq!(cfg.segment.duration_seconds, 60.0);
        assert_eq!(cfg.scoring.melody.max_cv, 0.6);
        assert_eq!(cfg.scoring.combine.weight_melody, 0.8);
        assert_eq!(cfg.scoring.tonal, TonalStrategy::BandRatio);
        assert!(!cfg.scoring.combine.enabled);
    }

    #[test]
    fn untouched_flags_keep_config() {
        let cli = Cli::try_parse_from(["prosody", "clip.mp3"]).unwrap();
        let mut cfg = Config::default();
        cfg.scoring.melody.max_cv = 0.45;
        apply_overrides(&cli, None, &mut cfg);
        assert_eq!(cfg.scoring.melody.max_cv, 0.45);
        assert!(cfg.scoring.combine.enabled);
    }

    #[test]
    fn weight_frequency_fills_in_for_tonal_weight() {
        let legacy = parse_weight("WEIGHT_FREQUENCY", Some(" 0.3 ".to_string())).unwrap();
        assert_eq!(legacy, Some(0.3));

        let cli = Cli::try_parse_from(["prosody", "clip.mp3"]).unwrap();
        let mut cfg = Config::default();
        apply_overrides(&cli, legacy, &mut cfg);
        assert_eq!(cfg.scoring.combine.weight_tonal, 0.3);

        let cli = Cli::try_parse_from(["prosody", "clip.mp3", "--weight-tonal", "0.9"]).unwrap();
        let mut cfg = Config::default();
        apply_overrides(&cli, legacy, &mut cfg);
        assert_eq!(cfg.scoring.combine.weight_tonal, 0.9);
    }

    #[test]
    fn bad_weight_frequency_is_an_error() {
        assert!(parse_weight("WEIGHT_FREQUENCY", Some("heavy".to_string())).is_err());
        assert_eq!(parse_weight("WEIGHT_FREQUENCY", None).unwrap(), None);
    }
}
