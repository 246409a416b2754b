use anyhow::{Context, Result};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use super::decode::AudioBuffer;

/// Resample a mono buffer to `target_rate` using rubato.
pub fn resample(buffer: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if buffer.sample_rate() == target_rate || buffer.is_empty() {
        return Ok(AudioBuffer::new(buffer.samples().to_vec(), target_rate));
    }
    anyhow::ensure!(buffer.sample_rate() > 0, "Cannot resample audio with a 0 Hz sample rate");

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = target_rate as f64 / buffer.sample_rate() as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0, // max relative ratio
        params,
        buffer.len(),
        1, // mono
    )
    .context("Failed to create resampler")?;

    let input = vec![buffer.samples().to_vec()];
    let output = resampler
        .process(&input, None)
        .context("Resampling failed")?;

    log::debug!(
        "Resampled {} Hz -> {} Hz ({} samples)",
        buffer.sample_rate(),
        target_rate,
        output.first().map_or(0, Vec::len)
    );

    Ok(AudioBuffer::new(
        output.into_iter().next().unwrap_or_default(),
        target_rate,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn same_rate_is_passthrough() {
        let buffer = AudioBuffer::new(vec![0.1, 0.2, 0.3], 22050);
        assert_eq!(resample(&buffer, 22050).unwrap(), buffer);
    }

    #[test]
    fn empty_buffer_takes_target_rate() {
        let buffer = AudioBuffer::new(Vec::new(), 44100);
        let out = resample(&buffer, 22050).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate(), 22050);
    }

    #[test]
    fn halves_length_when_downsampling() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();
        let out = resample(&AudioBuffer::new(samples, 44100), 22050).unwrap();
        assert_eq!(out.sample_rate(), 22050);
        let expected = 22050.0;
        assert!((out.len() as f64 - expected).abs() < expected * 0.02, "len {}", out.len());
    }
}
