//! Generator configuration.
//!
//! Every source kind is configured through the same [`GeneratorConfig`]. It is
//! validated once on construction so that the derived phase increment is
//! always finite and non-zero; the worker never re-checks it.

use thiserror::Error;

use crate::dsp::phase_increment;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,

    #[error("block size must be greater than zero")]
    ZeroBlockSize,

    #[error("frequency must be finite and non-zero, got {0}")]
    InvalidFrequency(f32),
}

/// Validated parameters for one signal source.
///
/// `frequency` is in Hz, `sample_rate` in Hz, `block_size` in samples. Only
/// the frequency may change while a source is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub frequency: f32,
    pub sample_rate: u32,
    pub block_size: usize,
}

impl GeneratorConfig {
    /// Build a config, rejecting degenerate frequency / rate combinations.
    ///
    /// # Errors
    /// - [`ConfigError::ZeroSampleRate`] if `sample_rate == 0`
    /// - [`ConfigError::ZeroBlockSize`] if `block_size == 0`
    /// - [`ConfigError::InvalidFrequency`] if `frequency` is not finite, is
    ///   zero, or produces a non-finite increment at `sample_rate`
    ///
    /// Negative frequencies are valid: the phasor then rotates clockwise.
    pub fn new(frequency: f32, sample_rate: u32, block_size: usize) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        check_frequency(frequency, sample_rate)?;
        Ok(Self { frequency, sample_rate, block_size })
    }

    /// Return a copy with a new frequency, validated against this sample rate.
    ///
    /// # Errors
    /// [`ConfigError::InvalidFrequency`] under the same rules as [`GeneratorConfig::new`].
    pub fn with_frequency(self, frequency: f32) -> Result<Self, ConfigError> {
        check_frequency(frequency, self.sample_rate)?;
        Ok(Self { frequency, ..self })
    }

    /// Per-sample phase increment in radians.
    #[inline]
    #[must_use]
    pub fn phase_increment(&self) -> f64 {
        phase_increment(self.frequency, self.sample_rate)
    }

    /// Capacity of the output stream: two blocks of margin.
    #[inline]
    #[must_use]
    pub fn stream_capacity(&self) -> usize {
        self.block_size * 2
    }
}

fn check_frequency(frequency: f32, sample_rate: u32) -> Result<(), ConfigError> {
    if !frequency.is_finite() || frequency == 0.0 {
        return Err(ConfigError::InvalidFrequency(frequency));
    }
    let inc = phase_increment(frequency, sample_rate);
    if !inc.is_finite() || inc == 0.0 {
        return Err(ConfigError::InvalidFrequency(frequency));
    }
    Ok(())
}
