use thiserror::Error;

/// Calibration problems detected when a scoring engine is built.
///
/// These are reported once at construction; scoring itself never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,

    #[error("frame length and hop length must be positive (frame={frame}, hop={hop})")]
    ZeroFrameGeometry { frame: usize, hop: usize },

    #[error(
        "frame length {frame} is too short to track {fmin:.2} Hz at {sample_rate} Hz \
         (needs at least {needed} samples)"
    )]
    FrameTooShort {
        frame: usize,
        fmin: f32,
        sample_rate: u32,
        needed: usize,
    },

    #[error("pitch range [{fmin}, {fmax}] Hz is invalid")]
    InvalidPitchRange { fmin: f32, fmax: f32 },

    #[error("pitch ceiling {fmax} Hz is above the Nyquist frequency {nyquist} Hz")]
    PitchAboveNyquist { fmax: f32, nyquist: f32 },

    #[error("voicing threshold must lie in (0, 1), got {0}")]
    InvalidThreshold(f32),

    #[error("max_cv must be positive, got {0}")]
    NonPositiveMaxCv(f64),

    #[error("decibel window [{min_db}, {max_db}] is empty or inverted")]
    InvertedDbWindow { min_db: f64, max_db: f64 },

    #[error("mid_weight must be finite and non-negative, got {0}")]
    InvalidMidWeight(f64),

    #[error("target_f0 must be positive, got {0}")]
    NonPositiveTarget(f64),

    #[error("{band} band [{lo}, {hi}) Hz is empty, inverted or negative")]
    InvalidBand {
        band: &'static str,
        lo: f32,
        hi: f32,
    },

    #[error("{name} weight must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
}
