//! The bit mixer: an Xorshift128+ style generator that XOR-folds an input
//! word into its state on every step.

/// Initial state words.  Every digest starts from these, so digests never
/// depend on earlier computations.
pub const SEED: [u64; 2] = [0x5555555555555555, 0xaaaaaaaaaaaaaaaa];

/// The two-word state advanced by every call to [`MixerState::mix`].
///
/// One state belongs to exactly one in-progress digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerState {
    pub s0: u64,
    pub s1: u64,
}

impl MixerState {
    pub fn new() -> Self {
        Self {
            s0: SEED[0],
            s1: SEED[1],
        }
    }

    /// Mixes `x` into the state and returns the next output word.
    ///
    /// The output is the sum of the state words *before* `x` is folded in, so
    /// `x` first shows up in the output of the following call.
    #[inline]
    pub fn mix(&mut self, x: u64) -> u64 {
        let c = x << 30;
        let b = self.s0;
        let a = self.s1;

        let result = a.wrapping_add(b);

        // The words swap roles each step.
        let b = b ^ (b << 23);
        self.s0 = a ^ c;
        self.s1 = b ^ a ^ (b >> 18) ^ (a >> 5);

        result
    }
}

impl Default for MixerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Free-function form of [`MixerState::mix`].
#[inline]
pub fn mix(state: &mut MixerState, x: u64) -> u64 {
    state.mix(x)
}
