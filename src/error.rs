//! Configuration errors
//!
//! Every constructor that takes caller-supplied tuning validates it once and
//! reports problems here instead of silently defaulting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("combat alphabet is empty")]
    EmptyAlphabet,
    #[error("combat alphabet needs at least 2 symbols, got {0}")]
    AlphabetTooSmall(usize),
    #[error("combat alphabet contains duplicate symbol {0:?}")]
    DuplicateSymbol(char),
    #[error("combat symbol {0:?} has no key; use uppercase ASCII letters")]
    UntypableSymbol(char),
    #[error("required rounds must be at least 1")]
    ZeroRounds,
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("mask has zero size ({width}x{height})")]
    EmptyMask { width: u32, height: u32 },
    #[error("mask data is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    MaskSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("angle step {0} degrees outside 1..=360")]
    AngleStepOutOfRange(f32),
    #[error("luminance threshold {0} outside 0..=255")]
    ThresholdOutOfRange(f32),
    #[error("failed to decode mask image: {0}")]
    MaskDecode(#[from] image::ImageError),
}

/// Require a finite, strictly positive value
pub(crate) fn positive(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// Require a finite, non-negative value
pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
