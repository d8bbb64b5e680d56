use crate::digest::{Digest, BLOCK_SIZE};

pub const IN_SIZE_BYTES: usize = BLOCK_SIZE;
pub const OUT_SIZE_BYTES: usize = 256 / 8;
pub const DIGEST_SIZE_BYTES: usize = 256 / 8;

/// The full digest of a single-block message.
///
/// Trailing zero bytes are indistinguishable from padding, so an all-zero
/// input here is the same as the empty message.
pub fn mix_input(in_bytes: &[u8], out_bytes: &mut [u8]) {
    assert!(in_bytes.len() == IN_SIZE_BYTES);
    assert!(out_bytes.len() == OUT_SIZE_BYTES);

    out_bytes.copy_from_slice(&Digest::of(in_bytes).to_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_digest_bytes() {
        let input = [7u8; IN_SIZE_BYTES];
        let mut output = [0u8; OUT_SIZE_BYTES];
        mix_input(&input, &mut output);
        assert_eq!(output, Digest::of(&input).to_bytes());
    }
}
