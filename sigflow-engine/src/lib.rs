//! sigflow engine — threaded signal sources streaming into bounded channels.
//!
//! Crate layout:
//! - [`stream`] : `BlockSink` / `WriterControl` traits and the `SampleStream` channel
//! - [`synth`]  : per-waveform block synthesizers (`Synth` trait)
//! - [`worker`] : worker thread lifecycle (`Idle → Running → StopRequested → Stopped`)
//! - [`source`] : public facades (`SineSource`, `NoiseSource`, `ComplexSineSource`)
//! - [`error`]  : `SourceError`
//!
//! One dedicated thread per running source. The only blocking points are the
//! stream write inside the worker and `stop()` joining it.

pub mod error;
pub mod source;
pub mod stream;
pub mod synth;
pub mod worker;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use error::SourceError;
pub use sigflow_core::config::{ConfigError, GeneratorConfig};
pub use sigflow_core::sample::IqSample;
pub use source::{ComplexSineSource, NoiseSource, SineSource};
pub use stream::{BlockSink, SampleStream, StreamError, WriterControl};
pub use synth::Synth;
pub use worker::{LifecycleState, Worker};
