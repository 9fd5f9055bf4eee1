//! Bounded single-producer / single-consumer sample stream.
//!
//! The sources only depend on the [`BlockSink`] trait: a blocking `write`
//! plus a writer-side cancellation flag. [`SampleStream`] is the in-tree
//! implementation, a `VecDeque` ring guarded by a `parking_lot::Mutex` with
//! one condvar per side.
//!
//! Cancellation is observed *inside* the blocking wait, so `stop_writer`
//! releases a writer stuck on backpressure immediately; the producer loop
//! never has to poll a flag.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("stream writer was stopped")]
    WriterStopped,

    #[error("stream reader was stopped")]
    ReaderStopped,
}

/// Writer-cancellation half of the stream contract. Independent of the
/// element type so the lifecycle controller can stop a stream it only knows
/// by handle.
///
/// NOTE: these are called from the control thread while `write` may be
/// blocked on the worker thread; implementations must make that race safe.
pub trait WriterControl: Send + Sync {
    /// Put the stream into writer-cancelled mode and wake any blocked writer.
    fn stop_writer(&self);

    /// Leave writer-cancelled mode so a new producer can write again.
    fn clear_write_stop(&self);
}

/// Writer-side contract a source needs from its output stream.
pub trait BlockSink<T>: WriterControl {
    /// Write a whole block, blocking while the stream is full.
    ///
    /// Returns the number of elements written (always `block.len()` on success).
    ///
    /// # Errors
    /// [`StreamError::WriterStopped`] once the writer has been cancelled,
    /// [`StreamError::ReaderStopped`] if the reader side has gone away.
    fn write(&self, block: &[T]) -> Result<usize, StreamError>;
}

struct Inner<T> {
    buf: VecDeque<T>,
    capacity: usize,
    writer_stopped: bool,
    reader_stopped: bool,
}

impl<T> Inner<T> {
    #[inline]
    fn free(&self) -> usize {
        self.capacity - self.buf.len()
    }
}

/// Bounded stream of `T` with blocking read / write.
pub struct SampleStream<T> {
    inner: Mutex<Inner<T>>,
    can_write: Condvar,
    can_read: Condvar,
}

impl<T: Copy> SampleStream<T> {
    /// Create a stream holding at most `capacity` elements (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                buf: VecDeque::with_capacity(capacity),
                capacity,
                writer_stopped: false,
                reader_stopped: false,
            }),
            can_write: Condvar::new(),
            can_read: Condvar::new(),
        }
    }

    /// Resize and empty the stream, clearing both stop flags.
    ///
    /// Call from the control thread only while no writer is active.
    pub fn init(&self, capacity: usize) {
        let capacity = capacity.max(1);
        let mut g = self.inner.lock();
        g.buf.clear();
        g.buf.reserve(capacity);
        g.capacity = capacity;
        g.writer_stopped = false;
        g.reader_stopped = false;
    }

    /// Blocking write of a whole block; see [`BlockSink::write`].
    ///
    /// Blocks longer than the capacity are pushed in capacity-sized chunks,
    /// in order, waiting for the reader between chunks.
    ///
    /// # Errors
    /// [`StreamError::WriterStopped`] or [`StreamError::ReaderStopped`].
    pub fn write(&self, block: &[T]) -> Result<usize, StreamError> {
        let mut g = self.inner.lock();
        if g.writer_stopped {
            return Err(StreamError::WriterStopped);
        }

        let mut off = 0;
        while off < block.len() {
            let chunk = (block.len() - off).min(g.capacity);
            loop {
                if g.writer_stopped {
                    return Err(StreamError::WriterStopped);
                }
                if g.reader_stopped {
                    return Err(StreamError::ReaderStopped);
                }
                if g.free() >= chunk {
                    break;
                }
                self.can_write.wait(&mut g);
            }
            g.buf.extend(block[off..off + chunk].iter().copied());
            off += chunk;
            self.can_read.notify_one();
        }
        Ok(block.len())
    }

    /// Block until at least one element is available, then copy up to
    /// `out.len()` elements. Returns the number copied.
    ///
    /// # Errors
    /// [`StreamError::ReaderStopped`] once `stop_reader` has been called.
    pub fn read(&self, out: &mut [T]) -> Result<usize, StreamError> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut g = self.inner.lock();
        loop {
            if g.reader_stopped {
                return Err(StreamError::ReaderStopped);
            }
            if !g.buf.is_empty() {
                break;
            }
            self.can_read.wait(&mut g);
        }
        let n = Self::drain_into(&mut g, out);
        self.can_write.notify_one();
        Ok(n)
    }

    /// Block until `out` is completely filled.
    ///
    /// # Errors
    /// [`StreamError::ReaderStopped`]; elements read before the stop are lost
    /// to the caller.
    pub fn read_exact(&self, out: &mut [T]) -> Result<(), StreamError> {
        let mut filled = 0;
        while filled < out.len() {
            filled += self.read(&mut out[filled..])?;
        }
        Ok(())
    }

    /// Non-blocking read; returns 0 when the stream is empty.
    pub fn try_read(&self, out: &mut [T]) -> usize {
        let mut g = self.inner.lock();
        let n = Self::drain_into(&mut g, out);
        if n > 0 {
            self.can_write.notify_one();
        }
        n
    }

    fn drain_into(g: &mut Inner<T>, out: &mut [T]) -> usize {
        let n = out.len().min(g.buf.len());
        for (dst, src) in out.iter_mut().zip(g.buf.drain(..n)) {
            *dst = src;
        }
        n
    }

    /// Put the stream into writer-cancelled mode and wake a blocked writer.
    pub fn stop_writer(&self) {
        self.inner.lock().writer_stopped = true;
        self.can_write.notify_all();
    }

    pub fn clear_write_stop(&self) {
        self.inner.lock().writer_stopped = false;
    }

    /// Stop the reader side; wakes both a blocked reader and a blocked writer.
    pub fn stop_reader(&self) {
        self.inner.lock().reader_stopped = true;
        self.can_read.notify_all();
        self.can_write.notify_all();
    }

    pub fn clear_read_stop(&self) {
        self.inner.lock().reader_stopped = false;
    }

    #[must_use] pub fn capacity(&self) -> usize { self.inner.lock().capacity }
    /// Elements currently buffered.
    #[must_use] pub fn available(&self) -> usize { self.inner.lock().buf.len() }
    #[must_use] pub fn is_writer_stopped(&self) -> bool { self.inner.lock().writer_stopped }
    #[must_use] pub fn is_reader_stopped(&self) -> bool { self.inner.lock().reader_stopped }
}

impl<T: Copy + Send> WriterControl for SampleStream<T> {
    #[inline]
    fn stop_writer(&self) {
        SampleStream::stop_writer(self);
    }

    #[inline]
    fn clear_write_stop(&self) {
        SampleStream::clear_write_stop(self);
    }
}

impl<T: Copy + Send> BlockSink<T> for SampleStream<T> {
    #[inline]
    fn write(&self, block: &[T]) -> Result<usize, StreamError> {
        SampleStream::write(self, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn delivers_in_write_order() {
        let s = Arc::new(SampleStream::<u32>::new(8));
        let w = Arc::clone(&s);
        let writer = thread::spawn(move || {
            for b in 0..100u32 {
                let block: Vec<u32> = (0..4).map(|i| b * 4 + i).collect();
                w.write(&block).unwrap();
            }
        });

        let mut got = vec![0u32; 400];
        s.read_exact(&mut got).unwrap();
        writer.join().unwrap();
        assert!(got.iter().enumerate().all(|(i, &v)| v == i as u32));
    }

    #[test]
    fn oversized_block_is_chunked() {
        let s = Arc::new(SampleStream::<u32>::new(3));
        let w = Arc::clone(&s);
        let writer = thread::spawn(move || w.write(&[1, 2, 3, 4, 5, 6, 7]));

        let mut got = [0u32; 7];
        s.read_exact(&mut got).unwrap();
        assert_eq!(writer.join().unwrap(), Ok(7));
        assert_eq!(got, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn stop_writer_releases_blocked_write() {
        let s = Arc::new(SampleStream::<f32>::new(4));
        s.write(&[0.0; 4]).unwrap();
        let w = Arc::clone(&s);
        let writer = thread::spawn(move || w.write(&[1.0; 4]));

        thread::sleep(Duration::from_millis(30));
        s.stop_writer();
        assert_eq!(writer.join().unwrap(), Err(StreamError::WriterStopped));

        // Further writes fail until cleared.
        assert_eq!(s.write(&[2.0]), Err(StreamError::WriterStopped));
        s.clear_write_stop();
        let mut out = [0.0f32; 4];
        assert_eq!(s.try_read(&mut out), 4);
        assert_eq!(s.write(&[3.0]), Ok(1));
    }

    #[test]
    fn stop_reader_releases_blocked_read_and_write() {
        let s = Arc::new(SampleStream::<f32>::new(2));
        let r = Arc::clone(&s);
        let reader = thread::spawn(move || {
            let mut out = [0.0f32; 1];
            r.read(&mut out)
        });
        thread::sleep(Duration::from_millis(30));
        s.stop_reader();
        assert_eq!(reader.join().unwrap(), Err(StreamError::ReaderStopped));
        assert_eq!(s.write(&[1.0]), Err(StreamError::ReaderStopped));
    }

    #[test]
    fn clear_read_stop_rearms_the_reader() {
        let s = SampleStream::<f32>::new(4);
        s.write(&[1.0, 2.0]).unwrap();
        s.stop_reader();
        let mut out = [0.0f32; 2];
        assert_eq!(s.read(&mut out), Err(StreamError::ReaderStopped));

        s.clear_read_stop();
        assert!(!s.is_reader_stopped());
        assert_eq!(s.read(&mut out), Ok(2));
        assert_eq!(out, [1.0, 2.0]);
        assert_eq!(s.write(&[3.0]), Ok(1));
    }

    #[test]
    fn init_resizes_and_clears() {
        let s = SampleStream::<f32>::new(4);
        s.write(&[1.0, 2.0]).unwrap();
        s.stop_writer();
        s.init(16);
        assert_eq!(s.capacity(), 16);
        assert_eq!(s.available(), 0);
        assert!(!s.is_writer_stopped());
    }
}
