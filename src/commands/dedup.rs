//! Streaming order-preserving deduplication.
//!
//! # Algorithm
//!
//! 1. Read the next line record from the concatenated input
//! 2. Fingerprint its exact bytes
//! 3. If the fingerprint was seen before, drop the record
//! 4. Otherwise record the fingerprint and write the record out
//!
//! Output is the input filtered to first occurrences, in input order.
//!
//! # Memory Complexity
//!
//! O(u) where u = number of distinct records; one 20-byte fingerprint is
//! kept per distinct record for the life of the run.

use crate::config::DedupConfig;
use crate::error::{DedupError, Result};
use crate::fingerprint::fingerprint;
use crate::input::{open_inputs, InputSource};
use crate::seen::SeenSet;
use crate::streaming::lines::{is_terminated, LineReader};
use crate::streaming::output::{FlushTask, OutputSink};
use log::{debug, info, warn};
use std::borrow::Cow;
use std::io::{self, Read, Write};

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Reading, filtering and writing records.
    Running,
    /// Input exhausted; the final flush is pending.
    Draining,
    /// Final flush done.
    Terminated,
}

/// Dedup command configuration.
#[derive(Debug, Clone, Default)]
pub struct DedupCommand {
    pub config: DedupConfig,
}

impl DedupCommand {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Deduplicate the given sources to stdout.
    pub fn run_stdout(&self, sources: Vec<InputSource>) -> Result<DedupStats> {
        self.run(sources, io::stdout())
    }

    /// Open the sources and deduplicate them into `output`.
    pub fn run<W: Write + Send + 'static>(
        &self,
        sources: Vec<InputSource>,
        output: W,
    ) -> Result<DedupStats> {
        let input = open_inputs(sources)?;
        self.run_streaming(input, output)
    }

    /// Core streaming loop over an already concatenated input.
    ///
    /// Buffered output is flushed before returning. After an input error
    /// the records accepted so far are still flushed; output errors are
    /// returned without touching the sink again.
    pub fn run_streaming<R: Read, W: Write + Send + 'static>(
        &self,
        input: R,
        output: W,
    ) -> Result<DedupStats> {
        let mut reader = LineReader::with_capacity(self.config.input_capacity(), input);
        let sink = OutputSink::with_capacity(self.config.output_buffer_bytes, output);
        debug!(
            "input buffer {} bytes, output buffer {} bytes, flush interval {}",
            self.config.input_capacity(),
            self.config.output_buffer_bytes,
            self.config.flush_interval
        );

        let mut flusher = sink.spawn_flusher(self.config.flush_interval);
        let mut seen = SeenSet::new();
        let mut stats = DedupStats::default();

        if let Err(e) = self.drive(&mut reader, &sink, &mut flusher, &mut seen, &mut stats) {
            stop_flusher(&mut flusher);
            if matches!(e, DedupError::Read(_)) {
                if let Err(flush_err) = sink.flush() {
                    warn!("{}", flush_err);
                }
            }
            return Err(e);
        }

        stats.records_read = reader.records_read();
        stats.bytes_read = reader.bytes_read();
        stats.unique_fingerprints = seen.len();
        info!("{}", stats);
        Ok(stats)
    }

    fn drive<R: Read, W: Write>(
        &self,
        reader: &mut LineReader<R>,
        sink: &OutputSink<W>,
        flusher: &mut Option<FlushTask>,
        seen: &mut SeenSet,
        stats: &mut DedupStats,
    ) -> Result<()> {
        let mut state = DriverState::Running;
        while state != DriverState::Terminated {
            state = match state {
                DriverState::Running => match reader.next_record()? {
                    Some(record) => {
                        self.process(record, seen, sink, stats)?;
                        DriverState::Running
                    }
                    None => DriverState::Draining,
                },
                DriverState::Draining => {
                    stop_flusher(flusher);
                    sink.flush()?;
                    DriverState::Terminated
                }
                DriverState::Terminated => DriverState::Terminated,
            };
        }
        Ok(())
    }

    fn process<W: Write>(
        &self,
        record: &[u8],
        seen: &mut SeenSet,
        sink: &OutputSink<W>,
        stats: &mut DedupStats,
    ) -> Result<()> {
        // Only the final record can be unterminated, so this copies at most once.
        let terminate = self.config.terminate_final_line && !is_terminated(record);
        let record: Cow<'_, [u8]> = if terminate {
            let mut owned = Vec::with_capacity(record.len() + 1);
            owned.extend_from_slice(record);
            owned.push(b'\n');
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(record)
        };

        if !seen.insert(fingerprint(&record)) {
            stats.duplicates_suppressed += 1;
            return Ok(());
        }

        sink.write(&record)?;
        stats.records_emitted += 1;
        stats.bytes_emitted += record.len() as u64;
        Ok(())
    }
}

fn stop_flusher(flusher: &mut Option<FlushTask>) {
    if let Some(task) = flusher.take() {
        task.stop();
    }
}

/// Statistics from a dedup run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DedupStats {
    /// Number of records read
    pub records_read: u64,
    /// Number of records written
    pub records_emitted: u64,
    /// Number of records dropped as repeats
    pub duplicates_suppressed: u64,
    /// Input bytes consumed
    pub bytes_read: u64,
    /// Output bytes written
    pub bytes_emitted: u64,
    /// Distinct fingerprints held at the end of the run
    pub unique_fingerprints: usize,
}

impl DedupStats {
    /// Fraction of input records that were repeats.
    pub fn duplicate_ratio(&self) -> f64 {
        if self.records_read == 0 {
            0.0
        } else {
            self.duplicates_suppressed as f64 / self.records_read as f64
        }
    }
}

impl std::fmt::Display for DedupStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Read: {}, Written: {}, Duplicates: {} ({:.2}%), Bytes in: {}, Bytes out: {}",
            self.records_read,
            self.records_emitted,
            self.duplicates_suppressed,
            self.duplicate_ratio() * 100.0,
            self.bytes_read,
            self.bytes_emitted
        )
    }
}
