//! Error types for the dedup pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while deduplicating.
///
/// None of these are recoverable: the driver stops at the first one and
/// hands it back to the caller. Output already delivered stays delivered.
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("standard input specified more than once")]
    DuplicateStdin,

    #[error("unable to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading input line: {0}")]
    Read(#[source] io::Error),

    #[error("unable to write output: {0}")]
    Write(#[source] io::Error),

    #[error("unable to flush output buffer: {0}")]
    Flush(#[source] io::Error),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

pub type Result<T> = std::result::Result<T, DedupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            DedupError::DuplicateStdin.to_string(),
            "standard input specified more than once"
        );

        let err = DedupError::Open {
            path: PathBuf::from("missing.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "unable to open missing.txt: not found");

        let err = DedupError::Flush(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(
            err.to_string(),
            "unable to flush output buffer: pipe closed"
        );
    }
}
