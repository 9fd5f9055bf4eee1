//! Block synthesizers: one per waveform kind.
//!
//! A [`Synth`] fills a scratch block in place. It is moved onto the worker
//! thread when a source starts and never touched by the control thread
//! afterwards. The only cross-thread input is the [`Tuning`] cell of the
//! periodic kinds, read before every sample advance.
//!
//! Contents:
//! - `SineSynth`        : `cos(phase)`
//! - `NoiseSynth`       : uniform noise in `[-1, 1)` from a worker-owned RNG
//! - `ComplexSineSynth` : `(sin(phase), cos(phase))` as [`IqSample`]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sigflow_core::phasor::Phasor;
use sigflow_core::sample::IqSample;

/// Anything that can synthesize one block of samples at a time.
pub trait Synth: Send + 'static {
    type Sample: Copy + Default + Send + 'static;

    /// Overwrite every element of `block`. Must not block or fail.
    fn fill(&mut self, block: &mut [Self::Sample]);
}

/// Phase increment shared between a source facade and its running synth.
///
/// Stored as `f64` bits in an `AtomicU64`.
#[derive(Debug)]
pub struct Tuning {
    increment_bits: AtomicU64,
}

impl Tuning {
    #[must_use]
    pub fn new(increment: f64) -> Self {
        Self { increment_bits: AtomicU64::new(increment.to_bits()) }
    }

    #[inline]
    pub fn set(&self, increment: f64) {
        self.increment_bits.store(increment.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.increment_bits.load(Ordering::Relaxed))
    }
}

/// Real sine (cosine phase) source.
#[derive(Debug)]
pub struct SineSynth {
    phasor: Phasor,
    tuning: Arc<Tuning>,
}

impl SineSynth {
    /// Fresh synth at phase 0.
    #[must_use]
    pub fn new(tuning: Arc<Tuning>) -> Self {
        Self { phasor: Phasor::new(), tuning }
    }
}

impl Synth for SineSynth {
    type Sample = f32;

    fn fill(&mut self, block: &mut [f32]) {
        for s in block.iter_mut() {
            *s = self.phasor.next_cos(self.tuning.get());
        }
        // Keep the accumulator bounded once per block.
        self.phasor.wrap();
    }
}

/// Complex-exponential source producing `i = sin`, `q = cos`.
#[derive(Debug)]
pub struct ComplexSineSynth {
    phasor: Phasor,
    tuning: Arc<Tuning>,
}

impl ComplexSineSynth {
    #[must_use]
    pub fn new(tuning: Arc<Tuning>) -> Self {
        Self { phasor: Phasor::new(), tuning }
    }
}

impl Synth for ComplexSineSynth {
    type Sample = IqSample;

    fn fill(&mut self, block: &mut [IqSample]) {
        for s in block.iter_mut() {
            *s = self.phasor.next_sin_cos(self.tuning.get()).into();
        }
        self.phasor.wrap();
    }
}

/// Uniform white noise over `[-1, 1)`.
///
/// Each synth owns its RNG; there is no process-wide generator state.
pub struct NoiseSynth<R = StdRng> {
    rng: R,
    dist: Uniform<f32>,
}

impl NoiseSynth<StdRng> {
    /// `Some(seed)` gives a reproducible sequence, `None` seeds from OS entropy.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rng)
    }
}

impl<R: Rng> NoiseSynth<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, dist: Uniform::new(-1.0, 1.0) }
    }
}

impl<R: Rng + Send + 'static> Synth for NoiseSynth<R> {
    type Sample = f32;

    fn fill(&mut self, block: &mut [f32]) {
        for s in block.iter_mut() {
            *s = self.dist.sample(&mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigflow_core::dsp::phase_increment;
    use std::f64::consts::PI;

    fn tuning(freq: f32, sr: u32) -> Arc<Tuning> {
        Arc::new(Tuning::new(phase_increment(freq, sr)))
    }

    #[test]
    fn first_block_matches_closed_form() {
        let mut synth = SineSynth::new(tuning(1000.0, 48_000));
        let mut block = [0.0f32; 4];
        synth.fill(&mut block);

        let d = 2.0 * PI * 1000.0 / 48_000.0;
        for (n, &s) in block.iter().enumerate() {
            let expected = (d * (n + 1) as f64).cos();
            assert!((f64::from(s) - expected).abs() < 1e-5, "n={n} s={s} expected={expected}");
        }
    }

    #[test]
    fn phase_is_continuous_across_blocks() {
        let (freq, sr) = (1234.5f32, 44_100u32);
        let mut synth = SineSynth::new(tuning(freq, sr));
        let mut block = vec![0.0f32; 256];
        let mut n = 0u64;
        for _ in 0..12 {
            synth.fill(&mut block);
            for &s in &block {
                n += 1;
                let expected = (2.0 * PI * f64::from(freq) * n as f64 / f64::from(sr)).cos();
                assert!((f64::from(s) - expected).abs() < 1e-5, "n={n} s={s} expected={expected}");
            }
        }
    }

    #[test]
    fn retune_applies_from_next_block() {
        let t = tuning(1000.0, 48_000);
        let mut synth = SineSynth::new(Arc::clone(&t));
        let mut first = [0.0f32; 8];
        synth.fill(&mut first);

        t.set(phase_increment(3000.0, 48_000));
        let mut second = [0.0f32; 8];
        synth.fill(&mut second);

        let d1 = 2.0 * PI * 1000.0 / 48_000.0;
        let d2 = 2.0 * PI * 3000.0 / 48_000.0;
        for (k, &s) in second.iter().enumerate() {
            let expected = (8.0 * d1 + d2 * (k + 1) as f64).cos();
            assert!((f64::from(s) - expected).abs() < 1e-5, "k={k}");
        }
    }

    #[test]
    fn complex_sine_is_sin_cos_pair() {
        let mut synth = ComplexSineSynth::new(tuning(500.0, 8_000));
        let mut block = [IqSample::default(); 64];
        synth.fill(&mut block);
        let d = 2.0 * PI * 500.0 / 8_000.0;
        for (n, s) in block.iter().enumerate() {
            let ph = d * (n + 1) as f64;
            assert!((f64::from(s.i) - ph.sin()).abs() < 1e-5);
            assert!((f64::from(s.q) - ph.cos()).abs() < 1e-5);
            assert!((s.norm_sqr() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn noise_stays_in_half_open_range() {
        let mut synth = NoiseSynth::from_seed(Some(42));
        let mut block = vec![0.0f32; 10_000];
        synth.fill(&mut block);
        assert!(block.iter().all(|&s| (-1.0..1.0).contains(&s)));
    }

    #[test]
    fn noise_is_reproducible_for_a_seed() {
        let mut a = NoiseSynth::from_seed(Some(9));
        let mut b = NoiseSynth::from_seed(Some(9));
        let (mut x, mut y) = ([0.0f32; 32], [0.0f32; 32]);
        a.fill(&mut x);
        b.fill(&mut y);
        assert_eq!(x, y);
    }

    #[test]
    fn noise_passes_kolmogorov_smirnov() {
        let mut synth = NoiseSynth::from_seed(Some(7));
        let mut samples = vec![0.0f32; 100_000];
        for chunk in samples.chunks_mut(512) {
            synth.fill(chunk);
        }
        samples.sort_by(f32::total_cmp);

        let n = samples.len() as f64;
        let mut d_max = 0.0f64;
        for (i, &x) in samples.iter().enumerate() {
            let cdf = (f64::from(x) + 1.0) / 2.0;
            let lo = i as f64 / n;
            let hi = (i + 1) as f64 / n;
            d_max = d_max.max((cdf - lo).abs()).max((hi - cdf).abs());
        }
        // alpha ~ 0.001
        let critical = 1.95 / n.sqrt();
        assert!(d_max < critical, "D={d_max} critical={critical}");
    }
}
