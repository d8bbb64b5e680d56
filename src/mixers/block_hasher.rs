use crate::{block::hash_block, xorshift::MixerState};

pub const IN_SIZE_BYTES: usize = 64 / 8;
pub const OUT_SIZE_BYTES: usize = 64 / 8;
pub const DIGEST_SIZE_BYTES: usize = 256 / 8;

/// One sub-block through the block hasher (forward then backward over the
/// bytes), starting from the seed state.
pub fn mix_input(in_bytes: &[u8], out_bytes: &mut [u8]) {
    assert!(in_bytes.len() == IN_SIZE_BYTES);
    assert!(out_bytes.len() == OUT_SIZE_BYTES);

    let mut state = MixerState::new();
    let hash = hash_block(in_bytes, &mut state);

    out_bytes.copy_from_slice(&u64::to_le_bytes(hash));
}
