use std::ops::Range;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::features::{BandEnergy, PowerSpectrum};
use super::frames::FrameSegmenter;
use crate::config::BandConfig;

/// FFT bin ranges for the three scoring bands at one sample rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandBins {
    pub low: Range<usize>,
    pub mid: Range<usize>,
    pub high: Range<usize>,
    /// The configured high band reached past Nyquist and was cut there
    pub clipped: bool,
}

impl BandBins {
    pub fn resolve(bands: &BandConfig, sample_rate: u32, fft_size: usize) -> Self {
        let resolution = sample_rate as f32 / fft_size as f32;
        let last_bin = fft_size / 2;
        let nyquist = sample_rate as f32 / 2.0;

        // [lo, hi) in Hz -> bins k with lo <= k * resolution < hi
        let to_bins = |lo_hz: f32, hi_hz: f32| -> Range<usize> {
            let start = ((lo_hz / resolution).ceil() as usize).min(last_bin + 1);
            let end = ((hi_hz / resolution).ceil() as usize).clamp(start, last_bin + 1);
            start..end
        };

        // An upper edge at or past Nyquist takes the Nyquist bin too
        let clipped = bands.high_max_hz > nyquist;
        let high = if bands.high_max_hz >= nyquist {
            let start = ((bands.high_min_hz / resolution).ceil() as usize).min(last_bin + 1);
            start..last_bin + 1
        } else {
            to_bins(bands.high_min_hz, bands.high_max_hz)
        };

        Self {
            low: to_bins(bands.low_min_hz, bands.low_max_hz),
            mid: to_bins(bands.mid_min_hz, bands.high_min_hz),
            high,
            clipped,
        }
    }
}

/// Hann-windowed power spectra and their band reduction.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    fft_size: usize,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self {
            fft,
            window: hann_window(fft_size),
            fft_size,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn power_spectrum(&self, frame: &[f32], sample_rate: u32) -> PowerSpectrum {
        let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); self.fft_size];
        for (slot, (&s, &w)) in buffer.iter_mut().zip(frame.iter().zip(&self.window)) {
            *slot = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut buffer);

        PowerSpectrum {
            bins: buffer[..=self.fft_size / 2]
                .iter()
                .map(|c| c.norm_sqr())
                .collect(),
            fft_size: self.fft_size,
            sample_rate,
        }
    }

    /// Mean high/mid energy per frame and total low energy across all frames.
    pub fn band_energy(
        &self,
        samples: &[f32],
        sample_rate: u32,
        segmenter: &FrameSegmenter,
        bands: &BandConfig,
    ) -> BandEnergy {
        let frames = segmenter.frames(samples.len());
        if frames.is_empty() {
            return BandEnergy::default();
        }

        let bins = BandBins::resolve(bands, sample_rate, self.fft_size);
        let band_sum = |power: &[f32], range: &Range<usize>| -> f64 {
            power[range.clone()].iter().map(|&p| p as f64).sum()
        };

        let mut low_sum = 0.0f64;
        let mut mid_sum = 0.0f64;
        let mut high_sum = 0.0f64;
        for frame in &frames {
            let spectrum = self.power_spectrum(&segmenter.samples(samples, frame), sample_rate);
            low_sum += band_sum(&spectrum.bins, &bins.low);
            mid_sum += band_sum(&spectrum.bins, &bins.mid);
            high_sum += band_sum(&spectrum.bins, &bins.high);
        }

        let n = frames.len() as f64;
        BandEnergy {
            low_sum,
            mid_mean: mid_sum / n,
            high_mean: high_sum / n,
            frames: frames.len(),
        }
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
