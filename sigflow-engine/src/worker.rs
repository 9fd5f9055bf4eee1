//! Worker lifecycle controller.
//!
//! Owns the background thread of one source and its
//! `Idle → Running → StopRequested → Stopped` state machine.
//!
//! - `start` moves a [`Synth`] onto a freshly spawned thread. The thread
//!   allocates its scratch block once, then loops *fill → blocking write*
//!   until the sink reports cancellation.
//! - `stop` cancels the sink's writer (which wakes a write stuck on
//!   backpressure), joins the thread, then clears the cancellation so the
//!   next `start` can write again.
//!
//! `start`/`stop` take `&mut self`: one controller, one control thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, trace, warn};

use crate::error::SourceError;
use crate::stream::{BlockSink, StreamError, WriterControl};
use crate::synth::Synth;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Running,
    StopRequested,
    Stopped,
}

pub struct Worker<K: WriterControl + ?Sized> {
    kind: &'static str,
    sink: Arc<K>,
    block_size: usize,
    state: LifecycleState,
    handle: Option<JoinHandle<()>>,
    /// Samples written by the current (or last) run.
    produced: Arc<AtomicU64>,
}

impl<K: WriterControl + ?Sized + 'static> Worker<K> {
    /// `kind` names the thread (`sigflow-<kind>`) and tags log lines.
    /// A zero `block_size` is raised to 1.
    pub fn new(kind: &'static str, sink: Arc<K>, block_size: usize) -> Self {
        Self {
            kind,
            sink,
            block_size: block_size.max(1),
            state: LifecycleState::Idle,
            handle: None,
            produced: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawn the worker thread running `synth`. No-op while already running.
    ///
    /// # Errors
    /// [`SourceError::Spawn`] if the OS refuses to create the thread; the
    /// controller stays in its previous state.
    pub fn start<Y>(&mut self, synth: Y) -> Result<(), SourceError>
    where
        Y: Synth,
        K: BlockSink<Y::Sample>,
    {
        if self.state == LifecycleState::Running {
            trace!(kind = self.kind, "start ignored: already running");
            return Ok(());
        }

        let sink = Arc::clone(&self.sink);
        let produced = Arc::clone(&self.produced);
        produced.store(0, Ordering::Relaxed);
        let block_size = self.block_size;
        let kind = self.kind;

        let handle = thread::Builder::new()
            .name(format!("sigflow-{kind}"))
            .spawn(move || run(kind, synth, &*sink, block_size, &produced))?;

        self.handle = Some(handle);
        self.state = LifecycleState::Running;
        debug!(kind, block_size, "worker started");
        Ok(())
    }

    /// Cancel, join and reset the sink. No-op unless running.
    pub fn stop(&mut self) {
        if self.state != LifecycleState::Running {
            trace!(kind = self.kind, state = ?self.state, "stop ignored: not running");
            return;
        }

        self.state = LifecycleState::StopRequested;
        self.sink.stop_writer();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(kind = self.kind, "worker thread panicked");
            }
        }

        self.sink.clear_write_stop();
        self.state = LifecycleState::Stopped;
        debug!(kind = self.kind, produced = self.produced(), "worker stopped");
    }

    /// Change the scratch block size used by the next `start`.
    ///
    /// Ignored while running. A zero size is raised to 1.
    pub fn set_block_size(&mut self, block_size: usize) {
        if self.state == LifecycleState::Running {
            warn!(kind = self.kind, "block size change ignored while running");
            return;
        }
        self.block_size = block_size.max(1);
    }

    #[inline] pub fn state(&self) -> LifecycleState { self.state }
    #[inline] pub fn is_running(&self) -> bool { self.state == LifecycleState::Running }
    #[inline] pub fn block_size(&self) -> usize { self.block_size }

    /// Samples successfully written since the last `start`.
    #[inline]
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    /// `true` while the thread is alive. It can exit on its own (e.g. the
    /// reader went away) while the state still reads `Running`.
    pub fn is_worker_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<K: WriterControl + ?Sized> Drop for Worker<K> {
    fn drop(&mut self) {
        if self.state != LifecycleState::Running {
            return;
        }
        self.sink.stop_writer();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(kind = self.kind, "worker thread panicked");
            }
        }
        self.sink.clear_write_stop();
        self.state = LifecycleState::Stopped;
    }
}

/// Body of the worker thread.
fn run<Y, K>(kind: &'static str, mut synth: Y, sink: &K, block_size: usize, produced: &AtomicU64)
where
    Y: Synth,
    K: BlockSink<Y::Sample> + ?Sized,
{
    let mut block = vec![Y::Sample::default(); block_size];
    loop {
        synth.fill(&mut block);
        match sink.write(&block) {
            Ok(n) => {
                produced.fetch_add(n as u64, Ordering::Relaxed);
            }
            Err(StreamError::WriterStopped) => {
                debug!(kind, "writer stopped; worker exiting");
                break;
            }
            Err(e) => {
                warn!(kind, error = %e, "stream closed under worker; exiting");
                break;
            }
        }
    }
}
