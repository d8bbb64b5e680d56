use std::{
    fs::File,
    io::{BufWriter, Write},
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use synhash::{
    mixers::{bit_mixer, block_hasher, digest_block},
    stats::{
        compute_distance_histogram, compute_stats, generate_8_random_bits,
        generate_bit_combinations, generate_counting, generate_gray_code, generate_random,
        generate_single_1_bit,
    },
};

/// Measures how well each stage of SynHash diffuses its input bits.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Only run stages whose name contains one of these (case-insensitive).
    filters: Vec<String>,

    /// Also compute the bit independence criterion.  Slow.
    #[arg(long, action)]
    bic: bool,

    /// Write an avalanche chart PNG for every stage and pattern.
    #[arg(long, action)]
    png: bool,

    /// Rounds per input pattern (the single-bit pattern always uses one round
    /// per input bit).
    #[arg(long, default_value_t = 1 << 12, value_parser = clap::value_parser!(u64).range(1..))]
    rounds: u64,
}

struct Stage<'a> {
    name: &'a str,
    mix_function: &'a dyn Fn(&[u8], &mut [u8]),
    input_size: usize,  // In bytes.
    output_size: usize, // In bytes.
    digest_size: usize, // In bytes.
}

const STAGES: &[Stage] = &[
    Stage {
        name: "Bit mixer, one step",
        mix_function: &bit_mixer::mix_input,
        input_size: bit_mixer::IN_SIZE_BYTES,
        output_size: bit_mixer::OUT_SIZE_BYTES,
        digest_size: bit_mixer::DIGEST_SIZE_BYTES,
    },
    Stage {
        name: "Block hasher, one sub-block",
        mix_function: &block_hasher::mix_input,
        input_size: block_hasher::IN_SIZE_BYTES,
        output_size: block_hasher::OUT_SIZE_BYTES,
        digest_size: block_hasher::DIGEST_SIZE_BYTES,
    },
    Stage {
        name: "Digest, one block",
        mix_function: &digest_block::mix_input,
        input_size: digest_block::IN_SIZE_BYTES,
        output_size: digest_block::OUT_SIZE_BYTES,
        digest_size: digest_block::DIGEST_SIZE_BYTES,
    },
];

struct BitPattern<'a> {
    name: &'a str,
    gen_function: &'a dyn Fn(usize, &mut [u8]),

    /// Whether to run one round per input bit instead of the requested
    /// number of rounds.
    per_input_bit: bool,
}

const PATTERNS: &[BitPattern] = &[
    BitPattern {
        name: "random",
        gen_function: &generate_random,
        per_input_bit: false,
    },
    BitPattern {
        name: "counting",
        gen_function: &generate_counting,
        per_input_bit: false,
    },
    BitPattern {
        name: "gray code",
        gen_function: &generate_gray_code,
        per_input_bit: false,
    },
    BitPattern {
        name: "bit combinations",
        gen_function: &generate_bit_combinations,
        per_input_bit: false,
    },
    BitPattern {
        name: "8 random bits",
        gen_function: &generate_8_random_bits,
        per_input_bit: false,
    },
    BitPattern {
        name: "single-bit",
        gen_function: &generate_single_1_bit,

        // NOTE: with so few samples even a very good mixer won't reach
        // "perfect" avalanche or BIC by this measure, so read these numbers
        // a little differently.
        per_input_bit: true,
    },
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let filters: Vec<String> = args.filters.iter().map(|f| f.to_lowercase()).collect();

    for stage in STAGES.iter() {
        if !filters.is_empty() {
            let lower_name = stage.name.to_lowercase();
            if !filters.iter().any(|filter| lower_name.contains(filter)) {
                continue;
            }
        }

        println!("\n================================");
        println!("{}", stage.name);
        for pattern in PATTERNS.iter() {
            println!("\nInput bit pattern: {}", pattern.name);
            let rounds = if pattern.per_input_bit {
                stage.input_size * 8
            } else {
                args.rounds as usize
            };
            let stats = compute_stats(
                pattern.gen_function,
                stage.mix_function,
                stage.input_size,
                stage.output_size,
                stage.digest_size,
                rounds,
                true,
                args.bic,
            );
            stats.print_report();
            if args.png {
                let path = format!("{} - {}.png", stage.name, pattern.name);
                let mut file = BufWriter::new(File::create(&path)?);
                stats.write_avalanche_png(&mut file)?;
                file.flush()?;
                tracing::info!(%path, "wrote avalanche chart");
            }
        }
    }

    // Whole-message view, through the same distance metric callers use.
    let name = "Digest distance, single-bit flips";
    let lower_name = name.to_lowercase();
    if filters.is_empty() || filters.iter().any(|filter| lower_name.contains(filter)) {
        println!("\n================================");
        println!("{}", name);
        for message_len in [1, 8, 31, 32, 33, 64] {
            compute_distance_histogram(generate_random, message_len, args.rounds as usize / 16 + 1)
                .print_report();
        }
    }

    Ok(())
}
