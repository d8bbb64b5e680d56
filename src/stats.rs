use std::io::Write;

use nanorand::{Rng, WyRand};

use crate::digest::{Digest, DIGEST_SIZE_BYTES};

/// Avalanche and bit independence statistics for one stage of the digest.
pub struct Stats {
    pub input_bit_len: usize,
    pub output_bit_len: usize,
    pub digest_bit_len: usize,

    // The number of samples accumulated.  Or put another way, the number of
    // rounds used to generate the chart.
    pub sample_count: usize,

    // `input_bit_len * output_bit_len` long.  Each element is a count of the
    // number of bit flips for a given in/out bit pairing.
    pub avalanche_chart: Vec<u32>,

    // For every input bit, the BIC quadrants for each ordered pair of output
    // bits: [both flipped, neither, only first, only second].
    pub bic_chart: Vec<[u32; 4]>,
}

impl Stats {
    pub fn new(
        input_bit_len: usize,
        output_bit_len: usize,
        digest_bit_len: usize,
        do_avalanche: bool,
        do_bic: bool,
    ) -> Self {
        Self {
            input_bit_len,
            output_bit_len,
            digest_bit_len,
            sample_count: 0,
            avalanche_chart: if do_avalanche {
                vec![0; input_bit_len * output_bit_len]
            } else {
                Vec::new()
            },
            bic_chart: if do_bic {
                vec![[0; 4]; input_bit_len * bic_stride(output_bit_len)]
            } else {
                Vec::new()
            },
        }
    }

    pub fn accumulate(&mut self, in_bit: usize, out_bit: usize, flipped: bool) {
        self.avalanche_chart[in_bit * self.output_bit_len + out_bit] += flipped as u32;
    }

    pub fn get(&self, in_bit: usize, out_bit: usize) -> u32 {
        self.avalanche_chart[in_bit * self.output_bit_len + out_bit]
    }

    pub fn get_row(&self, in_bit: usize) -> &[u32] {
        let start = in_bit * self.output_bit_len;
        let end = start + self.output_bit_len;
        &self.avalanche_chart[start..end]
    }

    /// Scale from flip counts to probabilities.  Zero when nothing has been
    /// sampled, so an empty run reports no flips instead of NaN.
    fn norm(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            1.0 / self.sample_count as f64
        }
    }

    fn flip_probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        let norm = self.norm();
        self.avalanche_chart
            .iter()
            .map(move |&flips| flips as f64 * norm)
    }

    /// Sum over output bits of how close each one is to flipping half the
    /// time.  A perfect mixer gives `output_bit_len`.
    pub fn row_diffusion(&self, in_bit: usize) -> f64 {
        let norm = self.norm();
        self.get_row(in_bit)
            .iter()
            .map(|&flips| 1.0 - p_to_bias(flips as f64 * norm))
            .sum()
    }

    pub fn row_entropy(&self, in_bit: usize) -> f64 {
        let norm = self.norm();
        self.get_row(in_bit)
            .iter()
            .map(|&flips| p_to_entropy(flips as f64 * norm))
            .sum()
    }

    pub fn average_bias(&self) -> f64 {
        let bias_sum: f64 = self.flip_probabilities().map(p_to_bias).sum();
        bias_sum / self.avalanche_chart.len() as f64
    }

    pub fn min_bias(&self) -> f64 {
        self.flip_probabilities()
            .map(p_to_bias)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_bias(&self) -> f64 {
        self.flip_probabilities().map(p_to_bias).fold(0.0, f64::max)
    }

    pub fn input_bit_diffusion(&self) -> [f64; 3] {
        summarize((0..self.input_bit_len).map(|i| self.row_diffusion(i)))
    }

    pub fn input_bit_entropy(&self) -> [f64; 3] {
        summarize((0..self.input_bit_len).map(|i| self.row_entropy(i)))
    }

    fn row_bic(&self, in_bit_idx: usize) -> &[[u32; 4]] {
        let stride = bic_stride(self.output_bit_len);
        let start = in_bit_idx * stride;
        &self.bic_chart[start..(start + stride)]
    }

    pub fn row_bic_avg_deviation(&self, in_bit_idx: usize) -> f64 {
        let bic = self.row_bic(in_bit_idx);

        let mut sum = 0.0;
        for [a, b, c, d] in bic.iter() {
            let min = *a.min(b).min(c).min(d);
            let max = *a.max(b).max(c).max(d);
            if max > 0 {
                sum += (max - min) as f64 / max as f64;
            }
        }
        sum / bic.len() as f64
    }

    pub fn bic_deviation(&self) -> [f64; 3] {
        summarize((0..self.input_bit_len).map(|i| self.row_bic_avg_deviation(i)))
    }

    /// Average of each quadrant after sorting, as fractions of the sample count.
    /// Ideal is `[0.25, 0.25, 0.25, 0.25]`.
    pub fn row_bic_avg_sorted_quadrants(&self, in_bit_idx: usize) -> [f64; 4] {
        let bic = self.row_bic(in_bit_idx);

        let mut sum = [0u64; 4];
        for mut quadrants in bic.iter().copied() {
            quadrants.sort_unstable();
            for (s, q) in sum.iter_mut().zip(quadrants.iter()) {
                *s += *q as u64;
            }
        }

        let norm = self.norm() / bic.len() as f64;
        sum.map(|s| s as f64 * norm)
    }

    pub fn avg_bic_sorted_quadrants(&self) -> [f64; 4] {
        let mut sum = [0.0; 4];
        for i in 0..self.input_bit_len {
            let n = self.row_bic_avg_sorted_quadrants(i);
            for (s, q) in sum.iter_mut().zip(n.iter()) {
                *s += q;
            }
        }
        sum.map(|s| s / self.input_bit_len as f64)
    }

    pub fn worst_bic_sorted_quadrants(&self) -> [f64; 4] {
        let mut worst = [f64::INFINITY, f64::INFINITY, f64::INFINITY, 0.0];
        for i in 0..self.input_bit_len {
            let n = self.row_bic_avg_sorted_quadrants(i);
            worst[0] = worst[0].min(n[0]);
            worst[1] = worst[1].min(n[1]);
            worst[2] = worst[2].min(n[2]);
            worst[3] = worst[3].max(n[3]);
        }
        worst
    }

    pub fn print_report(&self) {
        if self.sample_count == 0 {
            println!("    No samples.");
            return;
        }

        if !self.avalanche_chart.is_empty() {
            let diffusion = self.input_bit_diffusion();
            let entropy = self.input_bit_entropy();
            println!(
                "    Bias:
        Min: {:0.2}
        Avg: {:0.2}
        Max: {:0.2}
    Input Bit Diffusion (digest size = {} bits):
        Min: {:0.1} bits
        Avg: {:0.1} bits
        Max: {:0.1} bits
    Input Bit Diffusion Entropy (digest size = {} bits):
        Min: {:0.1} bits
        Avg: {:0.1} bits
        Max: {:0.1} bits",
                self.min_bias(),
                self.average_bias(),
                self.max_bias(),
                self.digest_bit_len,
                diffusion[0],
                diffusion[1],
                diffusion[2],
                self.digest_bit_len,
                entropy[0],
                entropy[1],
                entropy[2],
            );
        }

        if !self.bic_chart.is_empty() {
            let worst = self.worst_bic_sorted_quadrants();
            let avg = self.avg_bic_sorted_quadrants();
            let deviation = self.bic_deviation();

            println!(
                "    BIC quadrants (sorted):
        Wrst: [{:0.4}, {:0.4}, {:0.4}, {:0.4}]
         Avg: [{:0.4}, {:0.4}, {:0.4}, {:0.4}]
    BIC deviation: min {:0.4}, avg {:0.4}, max {:0.4}",
                worst[0],
                worst[1],
                worst[2],
                worst[3],
                avg[0],
                avg[1],
                avg[2],
                avg[3],
                deviation[0],
                deviation[1],
                deviation[2],
            );
        }
    }

    /// Encodes the avalanche chart as a grayscale PNG, one row per input
    /// bit.  Gray means the output bit flipped half the time.
    pub fn write_avalanche_png<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let mut pixels = Vec::with_capacity(self.avalanche_chart.len() * 4);

        for bit in self.avalanche_chart.iter().copied() {
            let v = (bit as u64 * 255)
                .checked_div(self.sample_count as u64)
                .unwrap_or(0)
                .min(255) as u8;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }

        png_encode_mini::write_rgba_from_u8(
            out,
            &pixels,
            self.output_bit_len as u32,
            self.input_bit_len as u32,
        )
    }
}

fn bic_stride(output_bit_len: usize) -> usize {
    output_bit_len * output_bit_len.saturating_sub(1)
}

/// `[min, avg, max]` of the values.
fn summarize<I: Iterator<Item = f64>>(values: I) -> [f64; 3] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }
    if count == 0 {
        return [0.0; 3];
    }
    [min, sum / count as f64, max]
}

/// Computes avalanche and BIC statistics for a given stage, using a provided
/// input generator.
///
/// - `generate_input`: takes a round index and fills an input block.  Must
///   be deterministic in the index.
/// - `mix`: takes input and overwrites the output.  Any data already in the
///   output buffer is ignored.
/// - `input_size`/`output_size`: sizes of `mix`'s input and output, in bytes.
/// - `digest_size`: size in bytes of the digest `mix` is part of.  Only used
///   for the printed report.
/// - `rounds`: how many inputs to sample.
pub fn compute_stats<F1, F2>(
    generate_input: F1,
    mix: F2,
    input_size: usize,
    output_size: usize,
    digest_size: usize,
    rounds: usize,
    do_avalanche: bool,
    do_bic: bool,
) -> Stats
where
    F1: Fn(usize, &mut [u8]),
    F2: Fn(&[u8], &mut [u8]),
{
    let out_bits = output_size * 8;
    let mut chart = Stats::new(
        input_size * 8,
        out_bits,
        digest_size * 8,
        do_avalanche,
        do_bic,
    );

    let mut input = vec![0u8; input_size];
    let mut output = vec![0u8; output_size];
    let mut input_tweaked = vec![0u8; input_size];
    let mut output_tweaked = vec![0u8; output_size];
    let mut flips = vec![false; out_bits];

    tracing::debug!(input_size, output_size, rounds, do_avalanche, do_bic, "computing stats");

    for round in 0..rounds {
        if round % 256 == 0 {
            eprint!(
                "\r                                                  \rRound {}/{}",
                round, rounds
            );
            let _ = std::io::stderr().flush();
        }

        generate_input(round, &mut input[..]);
        mix(&input[..], &mut output[..]);

        for in_bit_idx in 0..(input_size * 8) {
            input_tweaked.copy_from_slice(&input[..]);
            input_tweaked[in_bit_idx / 8] ^= 1 << (in_bit_idx % 8);
            mix(&input_tweaked[..], &mut output_tweaked[..]);

            for (out_bit_idx, flipped) in flips.iter_mut().enumerate() {
                let i = out_bit_idx / 8;
                let mask = 1 << (out_bit_idx % 8);
                *flipped = (output[i] & mask) != (output_tweaked[i] & mask);
            }

            // Avalanche.
            if do_avalanche {
                for (out_bit_idx, &flipped) in flips.iter().enumerate() {
                    chart.accumulate(in_bit_idx, out_bit_idx, flipped);
                }
            }

            // Bit independence criterion.
            if do_bic {
                let stride = bic_stride(out_bits);
                for i in 0..out_bits {
                    for j in 0..(out_bits - 1) {
                        let flipped_a = flips[i];
                        let flipped_b = flips[(i + j + 1) % out_bits];

                        let k = (in_bit_idx * stride) + (i * (out_bits - 1)) + j;
                        let quadrants = &mut chart.bic_chart[k];
                        quadrants[0] += (flipped_a && flipped_b) as u32;
                        quadrants[1] += (!flipped_a && !flipped_b) as u32;
                        quadrants[2] += (flipped_a && !flipped_b) as u32;
                        quadrants[3] += (!flipped_a && flipped_b) as u32;
                    }
                }
            }
        }

        chart.sample_count += 1;
    }

    eprint!("\r                                                  \r");

    chart
}

//-------------------------------------------------------------

/// How far apart full digests land when a single message bit is flipped,
/// measured with [`Digest::hamming_distance`].
pub struct DistanceHistogram {
    /// `counts[d]` is how many flips moved the digest by `d` bits.
    pub counts: Vec<u64>,
    pub message_len: usize,
}

impl DistanceHistogram {
    pub fn samples(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn min(&self) -> usize {
        self.counts.iter().position(|&c| c > 0).unwrap_or(0)
    }

    pub fn max(&self) -> usize {
        self.counts.iter().rposition(|&c| c > 0).unwrap_or(0)
    }

    pub fn mean(&self) -> f64 {
        let samples = self.samples();
        if samples == 0 {
            return 0.0;
        }
        let total: u64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(d, &c)| d as u64 * c)
            .sum();
        total as f64 / samples as f64
    }

    /// Number of flips that left the digest unchanged.
    pub fn collisions(&self) -> u64 {
        self.counts[0]
    }

    pub fn print_report(&self) {
        println!(
            "    Digest distance for single-bit flips ({}-byte messages, {} samples):
        Min: {} bits
        Avg: {:0.1} bits (ideal {})
        Max: {} bits
        Unchanged digests: {}",
            self.message_len,
            self.samples(),
            self.min(),
            self.mean(),
            DIGEST_SIZE_BYTES * 8 / 2,
            self.max(),
            self.collisions(),
        );
    }
}

/// Flips every bit of `rounds` generated messages in turn and records the
/// Hamming distance between the original and flipped digests.
pub fn compute_distance_histogram<F>(
    generate_input: F,
    message_len: usize,
    rounds: usize,
) -> DistanceHistogram
where
    F: Fn(usize, &mut [u8]),
{
    let mut histogram = DistanceHistogram {
        counts: vec![0; DIGEST_SIZE_BYTES * 8 + 1],
        message_len,
    };

    let mut message = vec![0u8; message_len];
    let mut tweaked = vec![0u8; message_len];

    for round in 0..rounds {
        generate_input(round, &mut message[..]);
        let digest = Digest::of(&message);

        for bit_idx in 0..(message_len * 8) {
            tweaked.copy_from_slice(&message);
            tweaked[bit_idx / 8] ^= 1 << (bit_idx % 8);

            let distance = digest.hamming_distance(&Digest::of(&tweaked));
            histogram.counts[distance as usize] += 1;
        }
    }

    histogram
}

pub fn p_to_bias(p: f64) -> f64 {
    (p * 2.0 - 1.0).abs()
}

pub fn p_to_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        0.0
    } else {
        let q = 1.0 - p;
        -(p * p.log2()) - (q * q.log2())
    }
}

//-------------------------------------------------------------

/// Generates a random byte stream.
pub fn generate_random(seed: usize, bytes: &mut [u8]) {
    let mut rng = WyRand::new_seed(mix64(seed as u64));
    rng.fill_bytes(bytes);
}

/// Generates a byte stream with all zero bits except one.
pub fn generate_single_1_bit(index: usize, bytes: &mut [u8]) {
    let bit_idx = index % (bytes.len() * 8);
    bytes.fill(0);
    bytes[bit_idx / 8] = 1 << (bit_idx % 8);
}

/// Generates a byte stream with roughly `n` random bits set to one.
pub fn generate_n_random_bits(seed: usize, bytes: &mut [u8], n: usize) {
    let mut rng = WyRand::new_seed(mix64(seed as u64 ^ mix64(n as u64)));

    bytes.fill(0);
    for _ in 0..n {
        let n = rng.generate_range(0..(bytes.len() * 8));
        bytes[n / 8] |= 1 << (n % 8);
    }
}

pub fn generate_8_random_bits(seed: usize, bytes: &mut [u8]) {
    generate_n_random_bits(seed, bytes, 8);
}

/// Generates a byte stream with the lowest bits counting up as a
/// little-endian integer.  Works for inputs shorter than 8 bytes too.
pub fn generate_counting(index: usize, bytes: &mut [u8]) {
    let n = bytes.len().min(8);
    bytes[..n].copy_from_slice(&u64::to_le_bytes(index as u64)[..n]);
    bytes[n..].fill(0);
}

/// Like `generate_counting`, but iterating through gray codes in order.
pub fn generate_gray_code(index: usize, bytes: &mut [u8]) {
    generate_counting(index ^ (index >> 1), bytes);
}

/// Generates all combinations of setting zero bits, then one bit, then two
/// bits, and so on, in that order.
pub fn generate_bit_combinations(index: usize, bytes: &mut [u8]) {
    let bit_len = bytes.len() * 8;

    // Compute the number of bits and the sub-index into that subsequence, for the
    // given index.
    let mut n = if bit_len < usize::BITS as usize {
        // Wrap to the total number of combinations if that's less than usize.
        index % (1 << bit_len)
    } else {
        index
    };
    let mut bits = 0;
    let mut combos = binomial(bit_len, bits);
    while n >= combos {
        n -= combos;
        bits += 1;
        combos = binomial(bit_len, bits);
    }

    // Generate the bits for the computed subsequence and sub-index.
    bytes.fill(0);
    let mut t = bit_len;
    while t > 0 && bits > 0 {
        let y = if t > bits { binomial(t - 1, bits) } else { 0 };

        if n >= y {
            bytes[(t - 1) / 8] |= 1 << ((t - 1) % 8);
            n -= y;
            bits -= 1;
        }

        t -= 1;
    }
}

const fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }

    if k == 0 {
        1
    } else if k > (n / 2) {
        binomial(n, n - k)
    } else {
        n * binomial(n - 1, k - 1) / k
    }
}

/// 64-bit bijective bit mixer, used only to decorrelate generator seeds.
fn mix64(mut n: u64) -> u64 {
    // Break zero sensitivity.
    n ^= 0x7be355f7c2e736d2;

    // http://zimbry.blogspot.ch/2011/09/better-bit-mixing-improving-on.html
    // (variant "Mix13")
    n ^= n >> 30;
    n = n.wrapping_mul(0xbf58476d1ce4e5b9);
    n ^= n >> 27;
    n = n.wrapping_mul(0x94d049bb133111eb);
    n ^= n >> 31;

    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixers::{bit_mixer, block_hasher, digest_block};

    #[test]
    fn bias_and_entropy_endpoints() {
        assert_eq!(p_to_bias(0.5), 0.0);
        assert_eq!(p_to_bias(0.0), 1.0);
        assert_eq!(p_to_bias(1.0), 1.0);
        assert_eq!(p_to_entropy(0.5), 1.0);
        assert_eq!(p_to_entropy(0.0), 0.0);
    }

    #[test]
    fn binomials() {
        assert_eq!(binomial(8, 0), 1);
        assert_eq!(binomial(8, 2), 28);
        assert_eq!(binomial(8, 7), 8);
        assert_eq!(binomial(3, 4), 0);
    }

    #[test]
    fn bit_combinations_order() {
        let mut bytes = [0u8; 1];
        generate_bit_combinations(0, &mut bytes);
        assert_eq!(bytes, [0]);

        // Indices 1..=8 are the single-bit patterns.
        let mut seen = 0u8;
        for i in 1..=8 {
            generate_bit_combinations(i, &mut bytes);
            assert_eq!(bytes[0].count_ones(), 1);
            seen |= bytes[0];
        }
        assert_eq!(seen, 0xff);

        generate_bit_combinations(9, &mut bytes);
        assert_eq!(bytes[0].count_ones(), 2);
    }

    #[test]
    fn counting_handles_short_inputs() {
        let mut bytes = [0xffu8; 3];
        generate_counting(0x0102, &mut bytes);
        assert_eq!(bytes, [0x02, 0x01, 0x00]);

        let mut bytes = [0xffu8; 10];
        generate_gray_code(3, &mut bytes);
        assert_eq!(bytes[0], 2);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn random_generators_are_deterministic() {
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        generate_random(42, &mut a);
        generate_random(42, &mut b);
        assert_eq!(a, b);

        generate_8_random_bits(7, &mut a);
        generate_8_random_bits(7, &mut b);
        assert_eq!(a, b);
        assert!(a.iter().map(|b| b.count_ones()).sum::<u32>() <= 8);
    }

    #[test]
    fn identity_has_no_diffusion() {
        let stats = compute_stats(
            generate_random,
            |input: &[u8], output: &mut [u8]| output.copy_from_slice(input),
            2,
            2,
            2,
            16,
            true,
            true,
        );

        assert_eq!(stats.sample_count, 16);
        for bit in 0..16 {
            assert_eq!(stats.get(bit, bit), 16);
            assert_eq!(stats.get(bit, (bit + 1) % 16), 0);
        }
        assert_eq!(stats.max_bias(), 1.0);
        assert_eq!(stats.min_bias(), 1.0);
        assert_eq!(stats.input_bit_diffusion(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn stages_produce_stats() {
        let stats = compute_stats(
            generate_random,
            block_hasher::mix_input,
            block_hasher::IN_SIZE_BYTES,
            block_hasher::OUT_SIZE_BYTES,
            block_hasher::DIGEST_SIZE_BYTES,
            8,
            true,
            false,
        );
        assert_eq!(stats.input_bit_len, 64);
        assert_eq!(stats.output_bit_len, 64);
        assert!(stats.average_bias() <= 1.0);

        let stats = compute_stats(
            generate_counting,
            bit_mixer::mix_input,
            bit_mixer::IN_SIZE_BYTES,
            bit_mixer::OUT_SIZE_BYTES,
            bit_mixer::DIGEST_SIZE_BYTES,
            4,
            true,
            true,
        );
        assert_eq!(stats.output_bit_len, 128);
        assert_eq!(stats.bic_chart.len(), 64 * 128 * 127);

        let stats = compute_stats(
            generate_single_1_bit,
            digest_block::mix_input,
            digest_block::IN_SIZE_BYTES,
            digest_block::OUT_SIZE_BYTES,
            digest_block::DIGEST_SIZE_BYTES,
            4,
            true,
            false,
        );
        assert!(stats.input_bit_diffusion()[2] > 0.0);
    }

    #[test]
    fn zero_rounds_reports_without_nan() {
        let stats = compute_stats(
            generate_random,
            block_hasher::mix_input,
            block_hasher::IN_SIZE_BYTES,
            block_hasher::OUT_SIZE_BYTES,
            block_hasher::DIGEST_SIZE_BYTES,
            0,
            true,
            true,
        );
        assert_eq!(stats.sample_count, 0);
        assert!(!stats.average_bias().is_nan());
        assert!(!stats.min_bias().is_nan());
        assert!(stats.input_bit_diffusion().iter().all(|v| !v.is_nan()));
        assert!(stats.input_bit_entropy().iter().all(|v| !v.is_nan()));
        assert!(stats.avg_bic_sorted_quadrants().iter().all(|v| !v.is_nan()));

        let mut png = Vec::new();
        stats.write_avalanche_png(&mut png).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn avalanche_png_encodes_to_any_writer() {
        let stats = compute_stats(
            generate_counting,
            block_hasher::mix_input,
            block_hasher::IN_SIZE_BYTES,
            block_hasher::OUT_SIZE_BYTES,
            block_hasher::DIGEST_SIZE_BYTES,
            4,
            true,
            false,
        );
        let mut png = Vec::new();
        stats.write_avalanche_png(&mut png).unwrap();
        assert!(png.len() > 8);
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn distance_histogram_totals() {
        let histogram = compute_distance_histogram(generate_random, 4, 3);
        assert_eq!(histogram.counts.len(), 257);
        assert_eq!(histogram.samples(), 3 * 32);
        assert!(histogram.min() <= histogram.max());
        assert!(histogram.max() <= 256);
        assert!(histogram.mean() > 0.0);
    }
}
