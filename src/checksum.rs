//! Fletcher's checksum, used to derive record identity.
//!
//! This is a fast, deterministic, non-cryptographic digest; collisions are
//! possible and acceptable for record lookup within one bounded zone.

use crate::errors::{Result, ZoneError};

/// Compute a 16, 32, or 64-bit Fletcher checksum over `data`.
///
/// The input is split into blocks of `size / 16` bytes, each block packed
/// little-endian into one integer, with the final block zero-padded. Returns
/// the digest as lowercase hex, zero-padded to at least 4 characters.
pub fn checksum(data: &str, size: u32) -> Result<String> {
    let bits = match size {
        16 | 32 | 64 => size / 2,
        _ => {
            return Err(ZoneError::InvalidArgument(format!(
                "valid checksum sizes are 16, 32 and 64, got {size}"
            )));
        }
    };
    Ok(fletcher(data.as_bytes(), bits))
}

/// 32-bit checksum of a record's canonical text. Infallible by construction.
pub(crate) fn record_hashid(text: &str) -> String {
    fletcher(text.as_bytes(), 16)
}

fn fletcher(data: &[u8], bits: u32) -> String {
    let block_size = (bits / 8) as usize;
    let modulus = (1u64 << bits) - 1;

    let mut a: u64 = 0;
    let mut b: u64 = 0;

    for chunk in data.chunks(block_size) {
        let mut block: u64 = 0;
        for (i, &byte) in chunk.iter().enumerate() {
            block |= (byte as u64) << (8 * i);
        }
        a = (a + block) % modulus;
        b = (b + a) % modulus;
    }

    format!("{:04x}", (b << bits) | a)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORD: &str = "abcde";

    #[test]
    fn test_checksum_16() {
        assert_eq!(checksum(WORD, 16).unwrap(), "c8f0");
    }

    #[test]
    fn test_checksum_32() {
        assert_eq!(checksum(WORD, 32).unwrap(), "f04fc729");
    }

    #[test]
    fn test_checksum_64() {
        assert_eq!(checksum(WORD, 64).unwrap(), "c8c6c527646362c6");
    }

    #[test]
    fn test_checksum_invalid_size() {
        for size in [0, 8, 24, 128] {
            assert!(matches!(
                checksum(WORD, size),
                Err(ZoneError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_checksum_minimum_width() {
        // Short inputs pad to 4 hex chars, never to the full digest width
        assert_eq!(checksum("a", 32).unwrap(), "610061");
        assert_eq!(checksum("", 32).unwrap(), "0000");
        assert_eq!(checksum("", 64).unwrap(), "0000");
    }

    #[test]
    fn test_checksum_deterministic() {
        let text = "@ 3600 IN A 192.0.2.1";
        assert_eq!(checksum(text, 32).unwrap(), checksum(text, 32).unwrap());
        assert_eq!(checksum(text, 32).unwrap(), "dd03d449");
    }

    #[test]
    fn test_record_hashid_matches_public_checksum() {
        let text = "ns 3600 IN A 192.0.2.2";
        assert_eq!(record_hashid(text), checksum(text, 32).unwrap());
    }
}
