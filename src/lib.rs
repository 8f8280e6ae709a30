//! orduniq: order-preserving line deduplication
//!
//! Reads one or more byte streams as a single concatenated input and emits
//! each distinct line once, in first-seen order. Lines are compared by the
//! SHA-1 digest of their exact bytes, so only a fixed-size fingerprint is
//! retained per distinct line.
//!
//! # Features
//!
//! - **Streaming I/O**: lines are filtered as they arrive
//! - **Byte-exact**: no trimming or decoding; a final line without a
//!   newline is kept as-is
//! - **Periodic flushing**: a background task can push buffered output to
//!   slow consumers on a fixed period
//!
//! # Example
//!
//! ```rust,no_run
//! use orduniq::{resolve_inputs, DedupCommand, DedupConfig};
//!
//! let sources = resolve_inputs(&["a.log", "b.log"]).unwrap();
//! let cmd = DedupCommand::new(DedupConfig::default());
//! let stats = cmd.run_stdout(sources).unwrap();
//! eprintln!("{}", stats);
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod input;
pub mod seen;
pub mod streaming;

// Re-export commonly used types
pub use commands::{DedupCommand, DedupStats, DriverState};
pub use config::{DedupConfig, FlushInterval};
pub use error::{DedupError, Result};
pub use fingerprint::{fingerprint, Fingerprint};
pub use input::{open_inputs, resolve_inputs, ConcatReader, InputSource};
pub use seen::SeenSet;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
