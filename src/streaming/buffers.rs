//! Buffer size and timing defaults for the streaming pipeline.
//!
//! The sizes only trade memory against the number of underlying I/O calls;
//! they never change what gets written.

use std::time::Duration;

/// Default output buffer size (1 KB).
/// Small enough that an interactive consumer sees output promptly.
pub const DEFAULT_OUTPUT_BUFFER: usize = 1024;

/// Default input read-ahead size (1 KB).
pub const DEFAULT_INPUT_BUFFER: usize = 1024;

/// Smallest read-ahead buffer the line reader will use.
/// A zero-sized buffer could never be refilled and would read as end of input.
pub const MIN_INPUT_BUFFER: usize = 16;

/// Initial capacity of the per-record scratch buffer.
pub const DEFAULT_LINE_BUFFER: usize = 256;

/// Default period of the background flush task.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Clamp a requested input buffer size to the supported minimum.
#[inline]
pub const fn input_buffer_size(requested: usize) -> usize {
    if requested < MIN_INPUT_BUFFER {
        MIN_INPUT_BUFFER
    } else {
        requested
    }
}
