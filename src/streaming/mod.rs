//! Streaming building blocks shared by the dedup driver.
//!
//! - Newline-delimited record reading with a tunable read-ahead buffer
//! - Buffered output with optional periodic background flushing
//! - Buffer size defaults

pub mod buffers;
pub mod lines;
pub mod output;

pub use lines::{is_terminated, LineReader};
pub use output::{FlushTask, OutputSink};
