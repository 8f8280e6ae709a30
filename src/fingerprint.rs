//! Fixed-width content fingerprints for line records.
//!
//! A record is identified by the SHA-1 digest of its exact bytes,
//! newline included when present. Digests stand in for byte equality:
//! two records are duplicates exactly when their fingerprints match.

use sha1::{Digest, Sha1};

/// Width of a fingerprint in bytes (160 bits).
pub const FINGERPRINT_LEN: usize = 20;

/// SHA-1 digest of a line record.
pub type Fingerprint = [u8; FINGERPRINT_LEN];

/// Compute the fingerprint of a record's raw bytes.
#[inline]
pub fn fingerprint(record: &[u8]) -> Fingerprint {
    let digest = Sha1::digest(record);
    let mut fp = [0u8; FINGERPRINT_LEN];
    fp.copy_from_slice(&digest);
    fp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(fp: &Fingerprint) -> String {
        fp.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hex(&fingerprint(b"")),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            hex(&fingerprint(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_identical_bytes_match() {
        assert_eq!(fingerprint(b"hello\n"), fingerprint(b"hello\n"));
    }

    #[test]
    fn test_newline_is_significant() {
        assert_ne!(fingerprint(b"a\n"), fingerprint(b"a"));
        assert_ne!(fingerprint(b"a\n"), fingerprint(b"a\r\n"));
    }
}
