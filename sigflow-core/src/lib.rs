#![cfg_attr(not(feature = "std"), no_std)]
//! sigflow core — no_std-ready building blocks for streaming signal sources.
//!
//! Features
//! - `std`    : (default) use the Rust standard library
//! - `no-std` : build with `#![no_std]` and use `libm` for trig
//!
//! Modules
//! - [`dsp`]    : math backend, `TAU`, phase increment and wrap helpers
//! - [`phasor`] : continuous phase accumulator used by the periodic sources
//! - [`sample`] : sample element types (`f32`, [`IqSample`](sample::IqSample))
//! - [`config`] : validated [`GeneratorConfig`](config::GeneratorConfig)
//!
//! Design
//! - No heap allocations and no threads here; the engine crate owns those
//! - Phase is accumulated in `f64` and emitted as `f32` samples

pub mod config;
pub mod dsp;
pub mod phasor;
pub mod sample;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::config::{ConfigError, GeneratorConfig};
    pub use crate::dsp::{phase_increment, wrap_phase, TAU};
    pub use crate::phasor::Phasor;
    pub use crate::sample::IqSample;
}
