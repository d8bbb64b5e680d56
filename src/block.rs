use crate::xorshift::MixerState;

/// Size of the sub-blocks fed to [`hash_block`], in bytes.
pub const SUB_BLOCK_SIZE: usize = 8;

/// Folds up to 8 bytes through the mixer into one 64-bit value.
///
/// The bytes are mixed first to last and then again last to first, so each
/// call advances `state` by `2 * bytes.len()` steps.  The state is meant to
/// keep advancing across a whole digest, which is why it is borrowed mutably
/// rather than reset here.
pub fn hash_block(bytes: &[u8], state: &mut MixerState) -> u64 {
    debug_assert!(bytes.len() <= SUB_BLOCK_SIZE);

    let mut result = 0u64;
    for &byte in bytes.iter() {
        result ^= state.mix(byte as u64);
    }
    for &byte in bytes.iter().rev() {
        result ^= state.mix(byte as u64);
    }

    result
}
