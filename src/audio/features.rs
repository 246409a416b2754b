use serde::Serialize;

/// A window over an [`AudioBuffer`](super::decode::AudioBuffer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    /// First sample of the frame in the source buffer
    pub start: usize,
    pub length: usize,
}

/// Per-frame F0 estimate. `frequency` is `None` for unvoiced frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchEstimate {
    pub frequency: Option<f32>,
    pub voiced: bool,
}

impl PitchEstimate {
    pub fn voiced(frequency: f32) -> Self {
        Self {
            frequency: Some(frequency),
            voiced: true,
        }
    }

    pub fn unvoiced() -> Self {
        Self {
            frequency: None,
            voiced: false,
        }
    }
}

/// Pitch estimates aligned one-to-one with the analysis frames.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct F0Contour {
    pub estimates: Vec<PitchEstimate>,
}

impl F0Contour {
    pub fn new(estimates: Vec<PitchEstimate>) -> Self {
        Self { estimates }
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn voiced_frequencies(&self) -> impl Iterator<Item = f32> + '_ {
        self.estimates
            .iter()
            .filter(|e| e.voiced)
            .filter_map(|e| e.frequency)
    }

    pub fn voiced_count(&self) -> usize {
        self.voiced_frequencies().count()
    }
}

impl FromIterator<PitchEstimate> for F0Contour {
    fn from_iter<I: IntoIterator<Item = PitchEstimate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Squared FFT magnitudes for bins `0..=n/2` of one frame.
#[derive(Clone, Debug)]
pub struct PowerSpectrum {
    pub bins: Vec<f32>,
    /// Transform size the bins came from
    pub fft_size: usize,
    pub sample_rate: u32,
}

impl PowerSpectrum {
    pub fn bin_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.fft_size as f32
    }
}

/// Band energies reduced over all frames of a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BandEnergy {
    /// Sum over every frame and bin in the low band
    pub low_sum: f64,
    /// Mean per-frame energy in the mid band
    pub mid_mean: f64,
    /// Mean per-frame energy in the high band
    pub high_mean: f64,
    pub frames: usize,
}

impl BandEnergy {
    /// High-band energy summed over frames instead of averaged
    pub fn high_total(&self) -> f64 {
        self.high_mean * self.frames as f64
    }
}
