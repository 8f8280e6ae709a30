//! Newline-delimited record reader.
//!
//! Splits a byte stream into line records with memchr over the read-ahead
//! buffer. Records keep their trailing `\n`; only the last record of the
//! stream may lack one. No other bytes are interpreted, so CR, NUL and
//! invalid UTF-8 pass through untouched.

use crate::error::{DedupError, Result};
use crate::streaming::buffers::{input_buffer_size, DEFAULT_INPUT_BUFFER, DEFAULT_LINE_BUFFER};
use memchr::memchr;
use std::io::{self, BufRead, BufReader, Read};

/// Streaming line record reader.
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    line: Vec<u8>,
    records_read: u64,
    bytes_read: u64,
}

impl<R: Read> LineReader<R> {
    /// Create a reader with the default read-ahead size.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_INPUT_BUFFER, reader)
    }

    /// Create a reader with a custom read-ahead size.
    ///
    /// Sizes below the supported minimum are rounded up.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(input_buffer_size(capacity), reader),
            line: Vec::with_capacity(DEFAULT_LINE_BUFFER),
            records_read: 0,
            bytes_read: 0,
        }
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` once the input is exhausted with nothing pending.
    /// A partial line at end of input is returned as a final record.
    pub fn next_record(&mut self) -> Result<Option<&[u8]>> {
        self.line.clear();

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DedupError::Read(e)),
            };
            if available.is_empty() {
                break;
            }

            match memchr(b'\n', available) {
                Some(pos) => {
                    self.line.extend_from_slice(&available[..=pos]);
                    self.reader.consume(pos + 1);
                    break;
                }
                None => {
                    let len = available.len();
                    self.line.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }

        if self.line.is_empty() {
            return Ok(None);
        }
        self.records_read += 1;
        self.bytes_read += self.line.len() as u64;
        Ok(Some(&self.line))
    }

    /// Number of records returned so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Number of input bytes returned so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

/// Check whether a record carries its newline terminator.
#[inline]
pub fn is_terminated(record: &[u8]) -> bool {
    record.last() == Some(&b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &[u8], capacity: usize) -> Vec<Vec<u8>> {
        let mut reader = LineReader::with_capacity(capacity, input);
        let mut records = Vec::new();
        while let Some(record) = reader.next_record().unwrap() {
            records.push(record.to_vec());
        }
        records
    }

    /// Reader that fails after yielding its data.
    struct FailingReader {
        data: &'static [u8],
        interrupted: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            if !self.data.is_empty() {
                let n = self.data.len().min(buf.len());
                buf[..n].copy_from_slice(&self.data[..n]);
                self.data = &self.data[n..];
                return Ok(n);
            }
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_terminated_lines() {
        let records = split(b"a\nb\na\nc\n", 1024);
        assert_eq!(
            records,
            vec![
                b"a\n".to_vec(),
                b"b\n".to_vec(),
                b"a\n".to_vec(),
                b"c\n".to_vec()
            ]
        );
    }

    #[test]
    fn test_unterminated_final_record() {
        let records = split(b"a\na", 1024);
        assert_eq!(records, vec![b"a\n".to_vec(), b"a".to_vec()]);
        assert!(is_terminated(&records[0]));
        assert!(!is_terminated(&records[1]));
    }

    #[test]
    fn test_empty_input() {
        assert!(split(b"", 1024).is_empty());
    }

    #[test]
    fn test_blank_lines_are_records() {
        let records = split(b"\n\nx\n", 1024);
        assert_eq!(
            records,
            vec![b"\n".to_vec(), b"\n".to_vec(), b"x\n".to_vec()]
        );
    }

    #[test]
    fn test_lines_longer_than_buffer() {
        let long = "x".repeat(100);
        let input = format!("{long}\nshort\n{long}");
        for capacity in [0, 16, 17, 64, 4096] {
            let records = split(input.as_bytes(), capacity);
            assert_eq!(records.len(), 3, "capacity {}", capacity);
            assert_eq!(records[0], format!("{long}\n").into_bytes());
            assert_eq!(records[1], b"short\n".to_vec());
            assert_eq!(records[2], long.clone().into_bytes());
        }
    }

    #[test]
    fn test_bytes_pass_through() {
        let records = split(b"caf\xc3\xa9\r\n\x00\xff\n", 1024);
        assert_eq!(
            records,
            vec![b"caf\xc3\xa9\r\n".to_vec(), b"\x00\xff\n".to_vec()]
        );
    }

    #[test]
    fn test_counters() {
        let mut reader = LineReader::new(&b"ab\ncd"[..]);
        while reader.next_record().unwrap().is_some() {}
        assert_eq!(reader.records_read(), 2);
        assert_eq!(reader.bytes_read(), 5);
    }

    #[test]
    fn test_read_error_is_fatal() {
        let mut reader = LineReader::new(FailingReader {
            data: b"ok\npartial",
            interrupted: false,
        });
        assert_eq!(reader.next_record().unwrap(), Some(&b"ok\n"[..]));
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, DedupError::Read(_)));
    }
}
