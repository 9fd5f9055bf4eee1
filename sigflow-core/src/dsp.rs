//! Math backend and phase helpers.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Phase math in `f64`; sample values are narrowed to `f32` at the very end
//!
//! Conventions:
//! - Angles are radians. The running phase of a source lives in `[0, TAU)`
//!   after every block; within a block it may exceed `TAU`.

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // libm (C math) in no_std
    if #[cfg(all(feature = "no-std", not(feature = "std")))] {
        #[inline] pub(crate) fn m_sin(x: f64) -> f64 { libm::sin(x) }
        #[inline] pub(crate) fn m_cos(x: f64) -> f64 { libm::cos(x) }
        #[inline] pub(crate) fn m_fmod(x: f64, y: f64) -> f64 { libm::fmod(x, y) }
    // std backend
    } else {
        #[inline] pub(crate) fn m_sin(x: f64) -> f64 { x.sin() }
        #[inline] pub(crate) fn m_cos(x: f64) -> f64 { x.cos() }
        #[inline] pub(crate) fn m_fmod(x: f64, y: f64) -> f64 { x % y }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π
pub const TAU: f64 = core::f64::consts::TAU;

// --------------------------------- Phase helpers ---------------------------------

/// Per-sample phase increment for a tone of `frequency` Hz at `sample_rate` Hz.
///
/// Computed as `2π / (sample_rate / frequency)`. A zero frequency yields a
/// non-finite (or zero) increment, so inputs should go through
/// [`GeneratorConfig::new`](crate::config::GeneratorConfig::new) first.
#[inline]
#[must_use]
pub fn phase_increment(frequency: f32, sample_rate: u32) -> f64 {
    TAU / (f64::from(sample_rate) / f64::from(frequency))
}

/// Wrap a phase into `[0, TAU)`.
#[inline]
#[must_use]
pub fn wrap_phase(p: f64) -> f64 {
    let r = m_fmod(p, TAU);
    let r = if r < 0.0 { r + TAU } else { r };
    // r + TAU can round up to exactly TAU for tiny negative r
    if r >= TAU { 0.0 } else { r }
}

/// `(sin x, cos x)` through the selected backend.
#[inline]
#[must_use]
pub fn sin_cos(x: f64) -> (f64, f64) {
    (m_sin(x), m_cos(x))
}

/// `cos x` through the selected backend.
#[inline]
#[must_use]
pub fn cos(x: f64) -> f64 {
    m_cos(x)
}

// --------------------------------- Tests (std only) ------------------------------
