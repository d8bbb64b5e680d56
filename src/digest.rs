//! The digest builder.
//!
//! Messages are processed in 32-byte blocks, zero-padded at the end.  Each
//! block is split into four 8-byte sub-blocks which are hashed in order and
//! then hashed again in reverse order, all with the same advancing mixer
//! state.  The eight results are XORed pairwise into the accumulators:
//!
//! ```text
//! h0 ^= fwd(sub0) ^ rev(sub3)
//! h1 ^= fwd(sub1) ^ rev(sub2)
//! h2 ^= fwd(sub2) ^ rev(sub1)
//! h3 ^= fwd(sub3) ^ rev(sub0)
//! ```
//!
//! The reverse pass hashes the very same bytes as the forward pass, only with
//! a further advanced state.  It looks like it might have been meant to hash
//! byte-reversed sub-blocks instead, but changing it would change every
//! digest, so it stays as is.

use std::{fmt, io, str::FromStr};

use crate::{
    block::{hash_block, SUB_BLOCK_SIZE},
    error::{Error, MalformedReason},
    xorshift::MixerState,
};

/// Message block size, in bytes.
pub const BLOCK_SIZE: usize = SUB_BLOCK_SIZE * 4;

pub const DIGEST_SIZE_BYTES: usize = 256 / 8;

/// Length of a rendered digest.
pub const DIGEST_HEX_LEN: usize = DIGEST_SIZE_BYTES * 2;

/// Number of blocks a message of `len` bytes is processed as.
///
/// An empty message still gets one (all-zero) block, so its digest is
/// well-defined and not all zeros.
pub fn block_count(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE).max(1)
}

/// A 256-bit digest, stored as the accumulators `h0..h3`.
///
/// Rendered (and parsed) as `h3 h2 h1 h0`, 16 lowercase hex digits each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Digest(pub [u64; 4]);

impl Digest {
    /// Computes the digest of `message`.
    pub fn of(message: &[u8]) -> Digest {
        let mut state = MixerState::new();
        let mut accum = [0u64; 4];

        for i in 0..block_count(message.len()) {
            let start = i * BLOCK_SIZE;
            let end = (start + BLOCK_SIZE).min(message.len());

            let mut block = [0u8; BLOCK_SIZE];
            block[..(end - start)].copy_from_slice(&message[start..end]);

            absorb_block(&block, &mut state, &mut accum);
        }

        Digest(accum)
    }

    pub fn words(&self) -> [u64; 4] {
        self.0
    }

    /// The digest as big-endian bytes, in the same order as the hex text.
    pub fn to_bytes(&self) -> [u8; DIGEST_SIZE_BYTES] {
        let mut bytes = [0u8; DIGEST_SIZE_BYTES];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(self.0.iter().rev()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    pub fn to_hex(&self) -> String {
        format!("{:x}", self)
    }
}

/// Mixes one padded block into the accumulators.
fn absorb_block(block: &[u8; BLOCK_SIZE], state: &mut MixerState, accum: &mut [u64; 4]) {
    let sub_blocks: [&[u8]; 4] = [
        &block[0..SUB_BLOCK_SIZE],
        &block[SUB_BLOCK_SIZE..(SUB_BLOCK_SIZE * 2)],
        &block[(SUB_BLOCK_SIZE * 2)..(SUB_BLOCK_SIZE * 3)],
        &block[(SUB_BLOCK_SIZE * 3)..BLOCK_SIZE],
    ];

    let mut forward = [0u64; 4];
    for (h, sub_block) in forward.iter_mut().zip(sub_blocks.iter()) {
        *h = hash_block(sub_block, state);
    }

    // `reverse[i]` is the hash of sub-block `3 - i`.
    let mut reverse = [0u64; 4];
    for (h, sub_block) in reverse.iter_mut().zip(sub_blocks.iter().rev()) {
        *h = hash_block(sub_block, state);
    }

    for i in 0..4 {
        accum[i] ^= forward[i] ^ reverse[i];
    }

    tracing::trace!(?accum, "absorbed block");
}

impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:016x}{:016x}{:016x}{:016x}",
            self.0[3], self.0[2], self.0[1], self.0[0]
        )
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl FromStr for Digest {
    type Err = Error;

    /// Parses the 64-digit hex form.  Upper case digits are accepted.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.len() != DIGEST_HEX_LEN {
            return Err(MalformedReason::WrongLength(text.len()).into());
        }
        if let Some(i) = text.bytes().position(|b| !b.is_ascii_hexdigit()) {
            return Err(MalformedReason::NonHexCharacter(i).into());
        }

        // All ASCII from here on, so slicing on any index is fine.
        let mut words = [0u64; 4];
        for (i, word) in words.iter_mut().rev().enumerate() {
            let group = &text[(i * 16)..((i + 1) * 16)];
            *word = u64::from_str_radix(group, 16)
                .map_err(|_| MalformedReason::NonHexCharacter(i * 16))?;
        }

        Ok(Digest(words))
    }
}

/// Incremental form of [`Digest::of`].
///
/// Feeding a message in any number of pieces gives the same digest as
/// hashing it in one go.
#[derive(Debug, Clone)]
pub struct Hasher {
    state: MixerState,
    accum: [u64; 4],
    buffer: [u8; BLOCK_SIZE],
    buffer_len: usize,
    blocks: usize,
}

impl Hasher {
    pub fn new() -> Self {
        Self {
            state: MixerState::new(),
            accum: [0; 4],
            buffer: [0; BLOCK_SIZE],
            buffer_len: 0,
            blocks: 0,
        }
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (BLOCK_SIZE - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..(self.buffer_len + take)].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];

            if self.buffer_len == BLOCK_SIZE {
                absorb_block(&self.buffer, &mut self.state, &mut self.accum);
                self.buffer_len = 0;
                self.blocks += 1;
            }
        }
    }

    pub fn finalize(mut self) -> Digest {
        if self.buffer_len > 0 || self.blocks == 0 {
            self.buffer[self.buffer_len..].fill(0);
            absorb_block(&self.buffer, &mut self.state, &mut self.accum);
        }
        Digest(self.accum)
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
