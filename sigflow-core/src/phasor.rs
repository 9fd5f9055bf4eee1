//! Continuous phase accumulator.
//!
//! The periodic sources keep one `Phasor` per running worker. The phase is
//! advanced *before* each sample is evaluated, so a fresh phasor emits
//! `cos(Δ)` first, not `cos(0)`. Call [`Phasor::wrap`] once per block to keep
//! the accumulator bounded; wrapping per sample is unnecessary.

use crate::dsp::{cos, sin_cos, wrap_phase};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Phasor {
    phase: f64, // radians
}

impl Phasor {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Advance by `increment` radians and return the new phase.
    #[inline]
    pub fn advance(&mut self, increment: f64) -> f64 {
        self.phase += increment;
        self.phase
    }

    /// Advance and evaluate `cos(phase)`.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_cos(&mut self, increment: f64) -> f32 {
        cos(self.advance(increment)) as f32
    }

    /// Advance and evaluate `(sin(phase), cos(phase))`.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_sin_cos(&mut self, increment: f64) -> (f32, f32) {
        let (s, c) = sin_cos(self.advance(increment));
        (s as f32, c as f32)
    }

    /// Reduce the phase modulo 2π into `[0, 2π)`.
    #[inline]
    pub fn wrap(&mut self) {
        self.phase = wrap_phase(self.phase);
    }

    #[inline] #[must_use] pub fn phase(&self) -> f64 { self.phase }
}
