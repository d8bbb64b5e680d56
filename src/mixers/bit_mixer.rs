use crate::xorshift::MixerState;

pub const IN_SIZE_BYTES: usize = 64 / 8;
pub const OUT_SIZE_BYTES: usize = 128 / 8;
pub const DIGEST_SIZE_BYTES: usize = 256 / 8;

/// A single step of the Xorshift128+ style bit mixer, starting from the seed
/// state.
///
/// The output of the step that absorbs the input doesn't depend on it at all
/// (it's just the sum of the seed words), so we instead report the two outputs
/// that follow.
pub fn mix_input(in_bytes: &[u8], out_bytes: &mut [u8]) {
    assert!(in_bytes.len() == IN_SIZE_BYTES);
    assert!(out_bytes.len() == OUT_SIZE_BYTES);

    let x = u64::from_le_bytes(in_bytes.try_into().unwrap());

    let mut state = MixerState::new();
    state.mix(x);

    out_bytes[0..8].copy_from_slice(&u64::to_le_bytes(state.mix(0)));
    out_bytes[8..16].copy_from_slice(&u64::to_le_bytes(state.mix(0)));
}
