//! Runtime configuration for a dedup run.
//!
//! A [`DedupConfig`] is built once at startup and handed to the driver.
//! Nothing here is global; two runs in the same process can use different
//! settings.

use crate::error::{DedupError, Result};
use crate::streaming::buffers::{
    input_buffer_size, DEFAULT_FLUSH_INTERVAL, DEFAULT_INPUT_BUFFER, DEFAULT_OUTPUT_BUFFER,
};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits beyond this are validated but ignored.
const MAX_FRACTION_DIGITS: usize = 20;

/// Period of the background flush task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushInterval {
    /// No background task; output is flushed only when the buffer fills
    /// and at the end of the run.
    Disabled,
    /// Flush on this fixed period for as long as the run lasts.
    Every(Duration),
}

impl FlushInterval {
    /// The flush period, if the background task is enabled.
    pub fn period(&self) -> Option<Duration> {
        match *self {
            FlushInterval::Disabled => None,
            FlushInterval::Every(period) => Some(period),
        }
    }
}

impl Default for FlushInterval {
    fn default() -> Self {
        FlushInterval::Every(DEFAULT_FLUSH_INTERVAL)
    }
}

impl fmt::Display for FlushInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushInterval::Disabled => write!(f, "disabled"),
            FlushInterval::Every(period) => write!(f, "{:?}", period),
        }
    }
}

/// Parse duration text such as `1s`, `250ms`, `1m30s` or `-1s`.
///
/// Zero and negative durations yield [`FlushInterval::Disabled`].
impl FromStr for FlushInterval {
    type Err = DedupError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DedupError::InvalidDuration(s.to_string());

        let text = s.trim();
        let (negative, mut rest) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        if rest == "0" {
            return Ok(FlushInterval::Disabled);
        }
        if rest.is_empty() {
            return Err(invalid());
        }

        let mut total: u128 = 0;
        while !rest.is_empty() {
            let number_len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            let (number, tail) = rest.split_at(number_len);
            let unit_len = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_len);
            rest = tail;

            let scale = unit_scale(unit).ok_or_else(invalid)?;
            let nanos = segment_nanos(number, scale).ok_or_else(invalid)?;
            total = total.checked_add(nanos).ok_or_else(invalid)?;
        }

        if negative || total == 0 {
            return Ok(FlushInterval::Disabled);
        }
        let nanos = u64::try_from(total).map_err(|_| invalid())?;
        Ok(FlushInterval::Every(Duration::from_nanos(nanos)))
    }
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Nanoseconds in one `<number><unit>` segment, or None if malformed.
fn segment_nanos(number: &str, scale: u128) -> Option<u128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };
    let mut nanos = whole.checked_mul(scale)?;

    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for b in fraction.bytes().take(MAX_FRACTION_DIGITS) {
        numerator = numerator * 10 + u128::from(b - b'0');
        denominator *= 10;
    }
    nanos = nanos.checked_add(numerator * scale / denominator)?;
    Some(nanos)
}

/// Settings for a single dedup run.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Output buffer capacity before a forced flush. Zero writes through.
    pub output_buffer_bytes: usize,
    /// Input read-ahead size.
    pub input_buffer_bytes: usize,
    /// Period of the background flush task.
    pub flush_interval: FlushInterval,
    /// Append a newline to an unterminated final record.
    pub terminate_final_line: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupConfig {
    pub fn new() -> Self {
        Self {
            output_buffer_bytes: DEFAULT_OUTPUT_BUFFER,
            input_buffer_bytes: DEFAULT_INPUT_BUFFER,
            flush_interval: FlushInterval::default(),
            terminate_final_line: false,
        }
    }

    /// Set the output buffer capacity.
    pub fn with_output_buffer(mut self, bytes: usize) -> Self {
        self.output_buffer_bytes = bytes;
        self
    }

    /// Set the input read-ahead size.
    pub fn with_input_buffer(mut self, bytes: usize) -> Self {
        self.input_buffer_bytes = bytes;
        self
    }

    /// Set the background flush period.
    pub fn with_flush_interval(mut self, interval: FlushInterval) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Terminate an unterminated final record with a newline.
    pub fn with_terminate_final_line(mut self, enabled: bool) -> Self {
        self.terminate_final_line = enabled;
        self
    }

    /// Read-ahead size actually used by the line reader.
    #[inline]
    pub fn input_capacity(&self) -> usize {
        input_buffer_size(self.input_buffer_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> FlushInterval {
        s.parse().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = DedupConfig::default();
        assert_eq!(config.output_buffer_bytes, 1024);
        assert_eq!(config.input_buffer_bytes, 1024);
        assert_eq!(
            config.flush_interval,
            FlushInterval::Every(Duration::from_secs(1))
        );
        assert!(!config.terminate_final_line);
    }

    #[test]
    fn test_input_capacity_clamped() {
        let config = DedupConfig::new().with_input_buffer(0);
        assert_eq!(config.input_capacity(), 16);
    }

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(parse("1s"), FlushInterval::Every(Duration::from_secs(1)));
        assert_eq!(
            parse("250ms"),
            FlushInterval::Every(Duration::from_millis(250))
        );
        assert_eq!(
            parse("10us"),
            FlushInterval::Every(Duration::from_micros(10))
        );
        assert_eq!(
            parse("10µs"),
            FlushInterval::Every(Duration::from_micros(10))
        );
        assert_eq!(parse("5ns"), FlushInterval::Every(Duration::from_nanos(5)));
        assert_eq!(parse("2m"), FlushInterval::Every(Duration::from_secs(120)));
        assert_eq!(parse("1h"), FlushInterval::Every(Duration::from_secs(3600)));
    }

    #[test]
    fn test_parse_compound_and_fraction() {
        assert_eq!(
            parse("1m30s"),
            FlushInterval::Every(Duration::from_secs(90))
        );
        assert_eq!(
            parse("1.5s"),
            FlushInterval::Every(Duration::from_millis(1500))
        );
        assert_eq!(
            parse(".5s"),
            FlushInterval::Every(Duration::from_millis(500))
        );
        assert_eq!(parse("+2s"), FlushInterval::Every(Duration::from_secs(2)));
    }

    #[test]
    fn test_parse_disabled() {
        assert_eq!(parse("0"), FlushInterval::Disabled);
        assert_eq!(parse("0s"), FlushInterval::Disabled);
        assert_eq!(parse("-1s"), FlushInterval::Disabled);
        assert_eq!(parse("-0"), FlushInterval::Disabled);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "-", "5", "1x", "s", "1..5s", "1s5", "abc"] {
            assert!(
                matches!(
                    bad.parse::<FlushInterval>(),
                    Err(DedupError::InvalidDuration(_))
                ),
                "expected {:?} to be rejected",
                bad
            );
        }
    }
}
