//! Public source facades: [`SineSource`], [`NoiseSource`], [`ComplexSineSource`].
//!
//! Each facade owns its output stream (sized to two blocks) and a
//! [`Worker`]. Downstream code gets the stream through `output()` and reads
//! from it on its own thread.
//!
//! Every `start` builds a fresh synth: periodic kinds restart at phase 0,
//! noise re-seeds from its seed policy. Samples still buffered in the stream
//! from the previous run are left there for the reader.

use std::sync::Arc;

use sigflow_core::config::{ConfigError, GeneratorConfig};
use sigflow_core::sample::IqSample;

use crate::error::SourceError;
use crate::stream::SampleStream;
use crate::synth::{ComplexSineSynth, NoiseSynth, SineSynth, Synth, Tuning};
use crate::worker::{LifecycleState, Worker};

/// State shared by all source kinds.
struct SourceCore<T: Copy + Send + 'static> {
    config: GeneratorConfig,
    output: Arc<SampleStream<T>>,
    worker: Worker<SampleStream<T>>,
}

impl<T: Copy + Default + Send + 'static> SourceCore<T> {
    fn new(kind: &'static str, config: GeneratorConfig) -> Self {
        let output = Arc::new(SampleStream::new(config.stream_capacity()));
        let worker = Worker::new(kind, Arc::clone(&output), config.block_size);
        Self { config, output, worker }
    }

    fn init(&mut self, config: GeneratorConfig) -> Result<(), SourceError> {
        if self.worker.is_running() {
            return Err(SourceError::Busy);
        }
        self.output.init(config.stream_capacity());
        self.worker.set_block_size(config.block_size);
        self.config = config;
        Ok(())
    }

    fn start<Y: Synth<Sample = T>>(&mut self, synth: Y) -> Result<(), SourceError> {
        self.worker.start(synth)
    }
}

macro_rules! source_accessors {
    ($sample:ty) => {
        pub fn stop(&mut self) {
            self.core.worker.stop();
        }

        /// Stream the worker writes into; hand this to the downstream reader.
        #[inline]
        #[must_use]
        pub fn output(&self) -> &Arc<SampleStream<$sample>> {
            &self.core.output
        }

        #[inline] #[must_use] pub fn config(&self) -> GeneratorConfig { self.core.config }
        #[inline] #[must_use] pub fn state(&self) -> LifecycleState { self.core.worker.state() }
        #[inline] #[must_use] pub fn is_running(&self) -> bool { self.core.worker.is_running() }

        /// Samples written to the stream since the last `start`.
        #[inline]
        #[must_use]
        pub fn produced(&self) -> u64 {
            self.core.worker.produced()
        }
    };
}

// --------------------------------- Sine ------------------------------------------

/// Real sine source: `cos(phase)` as `f32`.
pub struct SineSource {
    core: SourceCore<f32>,
    tuning: Arc<Tuning>,
}

impl SineSource {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            core: SourceCore::new("sine", config),
            tuning: Arc::new(Tuning::new(config.phase_increment())),
        }
    }

    /// Re-configure an idle or stopped source.
    ///
    /// # Errors
    /// [`SourceError::Config`] for degenerate inputs, [`SourceError::Busy`]
    /// while running.
    pub fn init(&mut self, frequency: f32, sample_rate: u32, block_size: usize) -> Result<(), SourceError> {
        let config = GeneratorConfig::new(frequency, sample_rate, block_size)?;
        self.core.init(config)?;
        self.tuning.set(config.phase_increment());
        Ok(())
    }

    /// Spawn the worker. No-op while running.
    ///
    /// # Errors
    /// [`SourceError::Spawn`] if the thread cannot be created.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.is_running() {
            return Ok(());
        }
        self.core.start(SineSynth::new(Arc::clone(&self.tuning)))
    }

    /// Live frequency change; the worker uses the new increment from its next
    /// sample advance on. Samples already in the stream are unaffected.
    /// Negative frequencies rotate the phase backwards.
    ///
    /// # Errors
    /// [`ConfigError::InvalidFrequency`]; the current frequency is kept.
    pub fn set_frequency(&mut self, frequency: f32) -> Result<(), ConfigError> {
        self.core.config = self.core.config.with_frequency(frequency)?;
        self.tuning.set(self.core.config.phase_increment());
        Ok(())
    }

    source_accessors!(f32);
}

// --------------------------------- Complex sine ----------------------------------

/// Complex-exponential source: `IqSample { i: sin, q: cos }`.
pub struct ComplexSineSource {
    core: SourceCore<IqSample>,
    tuning: Arc<Tuning>,
}

impl ComplexSineSource {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            core: SourceCore::new("complex-sine", config),
            tuning: Arc::new(Tuning::new(config.phase_increment())),
        }
    }

    /// # Errors
    /// See [`SineSource::init`].
    pub fn init(&mut self, frequency: f32, sample_rate: u32, block_size: usize) -> Result<(), SourceError> {
        let config = GeneratorConfig::new(frequency, sample_rate, block_size)?;
        self.core.init(config)?;
        self.tuning.set(config.phase_increment());
        Ok(())
    }

    /// # Errors
    /// See [`SineSource::start`].
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.is_running() {
            return Ok(());
        }
        self.core.start(ComplexSineSynth::new(Arc::clone(&self.tuning)))
    }

    /// # Errors
    /// See [`SineSource::set_frequency`].
    pub fn set_frequency(&mut self, frequency: f32) -> Result<(), ConfigError> {
        self.core.config = self.core.config.with_frequency(frequency)?;
        self.tuning.set(self.core.config.phase_increment());
        Ok(())
    }

    source_accessors!(IqSample);
}

// --------------------------------- Noise -----------------------------------------

/// Uniform noise source over `[-1, 1)`. The configured frequency is unused.
pub struct NoiseSource {
    core: SourceCore<f32>,
    seed: Option<u64>,
}

impl NoiseSource {
    /// Entropy-seeded noise.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { core: SourceCore::new("noise", config), seed: None }
    }

    /// Reproducible noise: every `start` replays the same sequence.
    #[must_use]
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self { core: SourceCore::new("noise", config), seed: Some(seed) }
    }

    /// # Errors
    /// See [`SineSource::init`].
    pub fn init(&mut self, frequency: f32, sample_rate: u32, block_size: usize) -> Result<(), SourceError> {
        let config = GeneratorConfig::new(frequency, sample_rate, block_size)?;
        self.core.init(config)
    }

    /// Seed policy for the next `start`.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    #[inline] #[must_use] pub fn seed(&self) -> Option<u64> { self.seed }

    /// # Errors
    /// See [`SineSource::start`].
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.is_running() {
            return Ok(());
        }
        self.core.start(NoiseSynth::from_seed(self.seed))
    }

    source_accessors!(f32);
}
