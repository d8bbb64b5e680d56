//! Bitwise similarity between digests.

use crate::{digest::Digest, error::Result};

impl Digest {
    /// Number of differing bits, in `0..=256`.
    pub fn hamming_distance(&self, other: &Digest) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Hamming distance between two rendered digests.
///
/// Fails with [`Error::MalformedDigest`](crate::Error::MalformedDigest) if
/// either string is not exactly 64 hex digits, rather than comparing whatever
/// prefix happens to parse.
pub fn hamming_distance(a: &str, b: &str) -> Result<u32> {
    let a: Digest = a.parse()?;
    let b: Digest = b.parse()?;
    Ok(a.hamming_distance(&b))
}
