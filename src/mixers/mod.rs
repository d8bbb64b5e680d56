//! Each stage of the digest wrapped as a fixed-size `mix_input` function, so
//! the avalanche statistics in [`crate::stats`] can be run against it.

pub mod bit_mixer;
pub mod block_hasher;
pub mod digest_block;
