use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use prosody::audio::resample::resample;
use prosody::{decode_audio, Diagnostics, ScoreRecord, ScoringEngine};

/// Time window cut from each input before scoring.
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct FileScore {
    pub file: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    #[serde(flatten)]
    pub record: ScoreRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub results: Vec<FileScore>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileFailure>,
}

/// Decode, cut, resample and score one file.
pub fn score_file(
    engine: &ScoringEngine,
    path: &Path,
    segment: Segment,
    with_diagnostics: bool,
) -> Result<FileScore> {
    let decoded = decode_audio(path)?;
    let excerpt = decoded.window(segment.start_seconds, segment.duration_seconds);
    if excerpt.is_empty() {
        log::warn!(
            "{}: nothing to score after {:.1}s ({:.1}s long)",
            path.display(),
            segment.start_seconds,
            decoded.duration()
        );
    }

    let analysis_rate = engine.config().analysis.sample_rate;
    let buffer = resample(&excerpt, analysis_rate)
        .with_context(|| format!("Failed to resample {}", path.display()))?;
    let analysis = engine.analyze(&buffer);

    let start_seconds = segment.start_seconds.max(0.0);
    Ok(FileScore {
        file: path.display().to_string(),
        start_seconds,
        end_seconds: start_seconds + excerpt.duration(),
        record: analysis.record,
        diagnostics: with_diagnostics.then_some(analysis.diagnostics),
    })
}

/// Score every input in parallel. Failures are collected per file.
pub fn score_files(
    engine: &ScoringEngine,
    inputs: &[PathBuf],
    segment: Segment,
    with_diagnostics: bool,
    show_progress: bool,
) -> Result<BatchReport> {
    let pb = if show_progress {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let outcomes: Vec<(PathBuf, Result<FileScore>)> = inputs
        .par_iter()
        .map(|path| {
            let outcome = score_file(engine, path, segment, with_diagnostics);
            pb.inc(1);
            (path.clone(), outcome)
        })
        .collect();

    pb.finish_and_clear();

    let mut report = BatchReport::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(score) => report.results.push(score),
            Err(err) => {
                log::error!("{}: {:#}", path.display(), err);
                report.errors.push(FileFailure {
                    file: path.display().to_string(),
                    error: format!("{:#}", err),
                });
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosody::ScoringConfig;

    #[test]
    fn missing_files_are_reported_not_fatal() {
        let engine = ScoringEngine::new(ScoringConfig::default()).unwrap();
        let inputs = vec![PathBuf::from("/nonexistent/a.mp3"), PathBuf::from("/nonexistent/b.mp3")];
        let segment = Segment {
            start_seconds: 0.0,
            duration_seconds: 60.0,
        };
        let report = score_files(&engine, &inputs, segment, false, false).unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].file, "/nonexistent/a.mp3");
    }

    #[test]
    fn report_serializes_flat_scores() {
        let report = BatchReport {
            results: vec![FileScore {
                file: "clip.wav".into(),
                start_seconds: 600.0,
                end_seconds: 660.0,
                record: ScoreRecord::new(12.5, 40.0, Some(26.25)),
                diagnostics: None,
            }],
            errors: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "results": [{
                    "file": "clip.wav",
                    "start_seconds": 600.0,
                    "end_seconds": 660.0,
                    "melody_score": 12.5,
                    "tonal_score": 40.0,
                    "combined_score": 26.25
                }]
            })
        );
    }
}
