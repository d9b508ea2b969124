//! Fixed-width perceptual fingerprints and the distance they are compared by.
//!
//! A fingerprint is a 256-bit unsigned integer derived from a 16×16 hash
//! grid, stored big-endian so that byte-wise ordering equals numeric
//! ordering. The ingestion job and the query path must use the same grid
//! size; [`HASH_GRID_SIZE`] is that shared constant.

use std::fmt;

use crate::error::{Result, ScryError};

/// Hash grid edge length shared by ingestion and query fingerprints.
///
/// Changing this silently invalidates every stored distance comparison, so
/// it is versioned here and nowhere else.
pub const HASH_GRID_SIZE: u32 = 16;

/// Fingerprint width in bytes (16×16 bits).
pub const HASH_BYTES: usize = 32;

/// A 256-bit perceptual fingerprint, big-endian.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PerceptualHash([u8; HASH_BYTES]);

impl PerceptualHash {
    /// Build from a big-endian 32-byte value.
    pub const fn from_be_bytes(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }

    /// Build from a byte slice; the slice must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; HASH_BYTES] = bytes
            .try_into()
            .map_err(|_| ScryError::InvalidHashLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Build from a small value occupying the low 128 bits.
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; HASH_BYTES];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str).map_err(|_| ScryError::InvalidHashLength(0))?;
        Self::from_slice(&bytes)
    }

    pub const fn to_be_bytes(self) -> [u8; HASH_BYTES] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PerceptualHash({})", self.to_hex())
    }
}

/// Non-negative 256-bit distance between two fingerprints.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashDistance([u8; HASH_BYTES]);

impl HashDistance {
    pub const ZERO: HashDistance = HashDistance([0u8; HASH_BYTES]);

    /// Build from a small value occupying the low 128 bits.
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; HASH_BYTES];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// The distance as a `u128`, if it fits in 128 bits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[..16].iter().all(|&b| b == 0) {
            let mut low = [0u8; 16];
            low.copy_from_slice(&self.0[16..]);
            Some(u128::from_be_bytes(low))
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for HashDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u128() {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for HashDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashDistance({})", self)
    }
}

/// Numeric absolute difference between two 256-bit fingerprint values.
///
/// Catalog matching compares fingerprints as plain integers: `|a - b|` over
/// the full 256-bit width. Bitwise Hamming distance is intentionally not
/// used, and every distance on the matching path comes from this one
/// function.
pub fn numeric_distance(a: &PerceptualHash, b: &PerceptualHash) -> HashDistance {
    let (hi, lo) = if a.0 >= b.0 { (&a.0, &b.0) } else { (&b.0, &a.0) };

    let mut out = [0u8; HASH_BYTES];
    let mut borrow = 0i32;
    for i in (0..HASH_BYTES).rev() {
        let mut diff = hi[i] as i32 - lo[i] as i32 - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = diff as u8;
    }
    // hi >= lo, so no borrow can remain after the last byte
    HashDistance(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_of_identical_hashes_is_zero() {
        let h = PerceptualHash::from_u128(123_456_789);
        assert_eq!(numeric_distance(&h, &h), HashDistance::ZERO);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = PerceptualHash::from_u128(100);
        let b = PerceptualHash::from_u128(120);
        assert_eq!(numeric_distance(&a, &b), numeric_distance(&b, &a));
        assert_eq!(numeric_distance(&a, &b), HashDistance::from_u128(20));
    }

    #[test]
    fn distance_borrows_across_byte_boundaries() {
        let a = PerceptualHash::from_u128(256);
        let b = PerceptualHash::from_u128(255);
        assert_eq!(numeric_distance(&a, &b), HashDistance::from_u128(1));

        let c = PerceptualHash::from_u128(1 << 64);
        let d = PerceptualHash::from_u128(1);
        assert_eq!(
            numeric_distance(&c, &d),
            HashDistance::from_u128((1 << 64) - 1)
        );
    }

    #[test]
    fn distance_spans_more_than_128_bits() {
        let max = PerceptualHash::from_be_bytes([0xFF; HASH_BYTES]);
        let zero = PerceptualHash::from_u128(0);
        let d = numeric_distance(&max, &zero);
        assert_eq!(d.as_bytes(), &[0xFF; HASH_BYTES]);
        assert_eq!(d.to_u128(), None);
        assert!(d.to_string().starts_with("0x"));
    }

    #[test]
    fn ordering_matches_numeric_value() {
        let small = PerceptualHash::from_u128(100);
        let mid = PerceptualHash::from_u128(5_000);
        let large = PerceptualHash::from_u128(9_000_000);
        assert!(small < mid && mid < large);

        assert!(HashDistance::from_u128(20) < HashDistance::from_u128(4_880));
        assert!(HashDistance::ZERO < HashDistance::from_u128(1));
    }

    #[test]
    fn hex_round_trip() {
        let h = PerceptualHash::from_u128(0xDEAD_BEEF);
        let parsed = PerceptualHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
        assert_eq!(h.to_hex().len(), 64);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = PerceptualHash::from_slice(&[0u8; 8]).unwrap_err();
        assert!(matches!(err, ScryError::InvalidHashLength(8)));
    }

    #[test]
    fn display_small_distance_as_decimal() {
        assert_eq!(HashDistance::from_u128(20).to_string(), "20");
    }
}
