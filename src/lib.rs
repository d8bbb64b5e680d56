//! SynHash: a small non-cryptographic 256-bit digest.
//!
//! A message is split into zero-padded 32-byte blocks.  Each block's four
//! 8-byte sub-blocks are folded through an Xorshift128+ style bit mixer, and
//! the results are XORed into four 64-bit accumulators.  Digests can be
//! compared with [`hamming_distance`].
//!
//! **This is not a cryptographic hash.**  It makes no claims of collision or
//! preimage resistance.
//!
//! ```
//! let a = synhash::digest(b"hello, world 1");
//! let b = synhash::digest(b"hello, world 2");
//! assert_eq!(a.len(), 64);
//! assert_eq!(synhash::hamming_distance(&a, &b).unwrap(), 118);
//! ```

pub mod block;
pub mod digest;
pub mod distance;
pub mod error;
pub mod mixers;
pub mod stats;
pub mod xorshift;

pub use block::{hash_block, SUB_BLOCK_SIZE};
pub use digest::{block_count, Digest, Hasher, BLOCK_SIZE, DIGEST_HEX_LEN, DIGEST_SIZE_BYTES};
pub use distance::hamming_distance;
pub use error::{Error, MalformedReason, Result};
pub use xorshift::{mix, MixerState, SEED};

/// Computes the digest of `message`, rendered as 64 lowercase hex digits.
pub fn digest(message: &[u8]) -> String {
    Digest::of(message).to_hex()
}
