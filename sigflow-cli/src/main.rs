//! sigflow CLI — runs one signal source against a metering consumer.
//!
//! The consumer reads as fast as it can, so the run length is in *signal*
//! time (`--duration-ms` worth of samples), not wall-clock time. A peak / RMS
//! meter line is logged every second of signal.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sigflow_engine::{ComplexSineSource, GeneratorConfig, IqSample, NoiseSource, SampleStream, SineSource};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Sine,
    Noise,
    Complex,
}

/// Command-line arguments for sigflow
#[derive(Parser, Debug)]
#[command(name = "sigflow")]
#[command(about = "Run a sigflow signal source into a metering consumer")]
#[command(version)]
struct Args {
    /// Source kind
    #[arg(short, long, value_enum, default_value_t = Kind::Sine, env = "SIGFLOW_KIND")]
    kind: Kind,

    /// Tone frequency in Hz (ignored by noise)
    #[arg(short, long, default_value_t = 1000.0, env = "SIGFLOW_FREQUENCY")]
    frequency: f32,

    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value_t = 48_000, env = "SIGFLOW_SAMPLE_RATE")]
    sample_rate: u32,

    /// Samples per block
    #[arg(short, long, default_value_t = 512, env = "SIGFLOW_BLOCK_SIZE")]
    block_size: usize,

    /// Amount of signal to consume, in milliseconds
    #[arg(short, long, default_value_t = 3_000, env = "SIGFLOW_DURATION_MS")]
    duration_ms: u64,

    /// Fixed noise seed (noise only)
    #[arg(long)]
    seed: Option<u64>,

    /// Switch to this frequency halfway through the run (periodic kinds only)
    #[arg(long)]
    retune: Option<f32>,
}

/// Instantaneous level used by the meter.
trait Level: Copy + Default {
    fn level(&self) -> f32;
}

impl Level for f32 {
    #[inline]
    fn level(&self) -> f32 {
        self.abs()
    }
}

impl Level for IqSample {
    #[inline]
    fn level(&self) -> f32 {
        self.norm_sqr().sqrt()
    }
}

/// Peak / RMS over consecutive windows of `interval` samples.
struct Meter {
    interval: u64,
    metered: u64,
    count: u64,
    peak: f32,
    sq: f64,
}

/// One completed meter window. `seconds` counts every sample metered so far.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Reading {
    seconds: u64,
    peak: f32,
    rms: f64,
}

impl Meter {
    fn new(sample_rate: u32) -> Self {
        Self { interval: u64::from(sample_rate.max(1)), metered: 0, count: 0, peak: 0.0, sq: 0.0 }
    }

    fn push(&mut self, level: f32) -> Option<Reading> {
        self.peak = self.peak.max(level);
        self.sq += f64::from(level) * f64::from(level);
        self.count += 1;
        self.metered += 1;
        if self.count < self.interval {
            return None;
        }
        let reading = Reading {
            seconds: self.metered / self.interval,
            peak: self.peak,
            rms: (self.sq / self.count as f64).sqrt(),
        };
        self.count = 0;
        self.peak = 0.0;
        self.sq = 0.0;
        Some(reading)
    }
}

/// Read `total` samples, logging a meter line every `sample_rate` samples.
/// `on_half` runs once when half of the samples have been consumed.
fn consume<T: Level>(
    stream: &SampleStream<T>,
    block_size: usize,
    sample_rate: u32,
    total: u64,
    mut on_half: impl FnMut(),
) -> Result<()> {
    let mut meter = Meter::new(sample_rate);
    let mut buf = vec![T::default(); block_size];
    let mut consumed: u64 = 0;
    let mut halfway_done = false;

    while consumed < total {
        let n = stream.read(&mut buf).context("stream reader stopped")?;
        for s in &buf[..n] {
            if let Some(r) = meter.push(s.level()) {
                info!(seconds = r.seconds, peak = %format!("{:.3}", r.peak), rms = %format!("{:.3}", r.rms), "meter");
            }
        }
        consumed += n as u64;

        if !halfway_done && consumed >= total / 2 {
            halfway_done = true;
            on_half();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sigflow=info,sigflow_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = GeneratorConfig::new(args.frequency, args.sample_rate, args.block_size)
        .context("invalid generator configuration")?;
    let total = args.duration_ms * u64::from(args.sample_rate) / 1000;

    info!(
        kind = ?args.kind,
        frequency = config.frequency,
        sample_rate = config.sample_rate,
        block_size = config.block_size,
        samples = total,
        "starting source"
    );

    let produced = match args.kind {
        Kind::Sine => {
            let mut src = SineSource::new(config);
            src.start()?;
            let out = Arc::clone(src.output());
            consume(&out, config.block_size, config.sample_rate, total, || {
                if let Some(f) = args.retune {
                    match src.set_frequency(f) {
                        Ok(()) => info!(frequency = f, "retuned"),
                        Err(e) => warn!(error = %e, "retune rejected"),
                    }
                }
            })?;
            src.stop();
            src.produced()
        }
        Kind::Complex => {
            let mut src = ComplexSineSource::new(config);
            src.start()?;
            let out = Arc::clone(src.output());
            consume(&out, config.block_size, config.sample_rate, total, || {
                if let Some(f) = args.retune {
                    match src.set_frequency(f) {
                        Ok(()) => info!(frequency = f, "retuned"),
                        Err(e) => warn!(error = %e, "retune rejected"),
                    }
                }
            })?;
            src.stop();
            src.produced()
        }
        Kind::Noise => {
            if args.retune.is_some() {
                warn!("--retune has no effect on noise");
            }
            let mut src = match args.seed {
                Some(seed) => NoiseSource::with_seed(config, seed),
                None => NoiseSource::new(config),
            };
            src.start()?;
            let out = Arc::clone(src.output());
            consume(&out, config.block_size, config.sample_rate, total, || {})?;
            src.stop();
            src.produced()
        }
    };

    info!(produced, "done");
    Ok(())
}
