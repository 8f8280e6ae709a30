//! Input source selection and concatenation.
//!
//! Inputs are resolved from command-line arguments, validated, opened
//! up front and then read back to back as one virtual stream.

use crate::error::{DedupError, Result};
use log::debug;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Argument token that selects standard input.
pub const STDIN_TOKEN: &str = "-";

/// One input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    Path(PathBuf),
}

impl InputSource {
    /// Interpret a command-line argument, mapping `-` to standard input.
    pub fn from_arg<P: AsRef<Path>>(arg: P) -> Self {
        let arg = arg.as_ref();
        if arg.as_os_str() == STDIN_TOKEN {
            InputSource::Stdin
        } else {
            InputSource::Path(arg.to_path_buf())
        }
    }
}

/// Turn arguments into input sources.
///
/// An empty list means standard input only. Standard input may be named
/// at most once; this is checked before anything is opened.
pub fn resolve_inputs<P: AsRef<Path>>(args: &[P]) -> Result<Vec<InputSource>> {
    if args.is_empty() {
        return Ok(vec![InputSource::Stdin]);
    }

    let mut used_stdin = false;
    let mut sources = Vec::with_capacity(args.len());
    for arg in args {
        let source = InputSource::from_arg(arg);
        if source == InputSource::Stdin {
            if used_stdin {
                return Err(DedupError::DuplicateStdin);
            }
            used_stdin = true;
        }
        sources.push(source);
    }
    Ok(sources)
}

/// Open every source in order and chain them.
///
/// All files are opened before any line is read, so a missing path fails
/// the run before output starts.
pub fn open_inputs(sources: Vec<InputSource>) -> Result<ConcatReader> {
    let mut readers: Vec<Box<dyn Read>> = Vec::with_capacity(sources.len());
    for source in sources {
        match source {
            InputSource::Stdin => {
                debug!("reading standard input");
                readers.push(Box::new(io::stdin()));
            }
            InputSource::Path(path) => {
                let file = File::open(&path).map_err(|source| DedupError::Open {
                    path: path.clone(),
                    source,
                })?;
                debug!("opened {}", path.display());
                readers.push(Box::new(file));
            }
        }
    }
    Ok(ConcatReader::new(readers))
}

/// Reads a sequence of streams back to back.
///
/// Each stream is read to exhaustion and dropped before the next one
/// starts, so files are closed as soon as they are consumed.
pub struct ConcatReader {
    readers: VecDeque<Box<dyn Read>>,
}

impl ConcatReader {
    pub fn new(readers: Vec<Box<dyn Read>>) -> Self {
        Self {
            readers: readers.into(),
        }
    }

    /// Append another stream after the existing ones.
    pub fn push<R: Read + 'static>(&mut self, reader: R) {
        self.readers.push_back(Box::new(reader));
    }

}

impl Read for ConcatReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(current) = self.readers.front_mut() {
            let n = current.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            self.readers.pop_front();
        }
        Ok(0)
    }
}
