use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Prints the SynHash digests of two messages and the Hamming distance
/// between them.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[arg(default_value = "hello, world 1")]
    first: String,
    #[arg(default_value = "hello, world 2")]
    second: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let first = synhash::digest(args.first.as_bytes());
    println!("256-bit Hash: {}", first);

    let second = synhash::digest(args.second.as_bytes());
    println!("256-bit Hash: {}", second);

    let distance = synhash::hamming_distance(&first, &second)?;
    println!("Hamming Distance: {}", distance);

    Ok(())
}
