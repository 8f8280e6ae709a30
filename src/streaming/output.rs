//! Buffered output sink with optional periodic flushing.
//!
//! The driver writes records into the sink while a background task may
//! flush it on a fixed period. Both go through one mutex around the
//! buffer, so a flush always delivers whole records in write order.

use crate::config::FlushInterval;
use crate::error::{DedupError, Result};
use crate::streaming::buffers::DEFAULT_OUTPUT_BUFFER;
use crossbeam_channel::{bounded, select, tick, Sender};
use log::{debug, error, warn};
use std::io::{self, BufWriter, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct SinkState<W: Write> {
    writer: BufWriter<W>,
    /// First failure seen by the background flusher.
    failure: Option<(io::ErrorKind, String)>,
}

impl<W: Write> SinkState<W> {
    fn check(&self) -> Result<()> {
        match &self.failure {
            Some((kind, message)) => {
                Err(DedupError::Flush(io::Error::new(*kind, message.clone())))
            }
            None => Ok(()),
        }
    }
}

/// Shared, buffered output destination.
///
/// Cloning yields another handle to the same buffer.
pub struct OutputSink<W: Write> {
    state: Arc<Mutex<SinkState<W>>>,
}

impl<W: Write> Clone for OutputSink<W> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<W: Write> OutputSink<W> {
    /// Create a sink with the default buffer capacity.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    /// Create a sink with a custom buffer capacity. Zero writes through.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState {
                writer: BufWriter::with_capacity(capacity, output),
                failure: None,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SinkState<W>>> {
        self.state.lock().map_err(|_| {
            DedupError::Write(io::Error::new(io::ErrorKind::Other, "output lock poisoned"))
        })
    }

    /// Append bytes, writing the buffer out if it fills.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut state = self.lock()?;
        state.check()?;
        state.writer.write_all(bytes).map_err(DedupError::Write)
    }

    /// Deliver all buffered bytes to the destination.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.check()?;
        state.writer.flush().map_err(DedupError::Flush)
    }

    /// Flush on behalf of the background task. Returns false once the
    /// task should stop.
    fn flush_in_background(&self) -> bool {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(_) => {
                error!("output lock poisoned, stopping background flush");
                return false;
            }
        };
        if state.failure.is_some() {
            return false;
        }
        match state.writer.flush() {
            Ok(()) => true,
            Err(e) => {
                error!("unable to flush output buffer: {}", e);
                state.failure = Some((e.kind(), e.to_string()));
                false
            }
        }
    }
}

impl<W: Write + Send + 'static> OutputSink<W> {
    /// Start the background flush task, unless the interval is disabled.
    pub fn spawn_flusher(&self, interval: FlushInterval) -> Option<FlushTask> {
        let period = interval.period()?;
        Some(FlushTask::spawn(self.clone(), period))
    }
}

/// Handle to the background flush thread.
///
/// The thread flushes the sink once per period until this handle is
/// stopped or dropped, or until a flush fails.
pub struct FlushTask {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FlushTask {
    fn spawn<W: Write + Send + 'static>(sink: OutputSink<W>, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let ticker = tick(period);
        debug!("background flush every {:?}", period);

        let handle = thread::spawn(move || {
            loop {
                select! {
                    recv(ticker) -> _ => {
                        if !sink.flush_in_background() {
                            break;
                        }
                    }
                    recv(shutdown_rx) -> _ => break,
                }
            }
            debug!("background flush stopped");
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop the thread and wait for any in-progress flush to finish.
    pub fn stop(mut self) {
        self.shutdown_now();
    }

    fn shutdown_now(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread.
        drop(self.shutdown.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("background flush thread panicked");
            }
        }
    }
}

impl Drop for FlushTask {
    fn drop(&mut self) {
        self.shutdown_now();
    }
}
