//! `huff` - static Huffman file compressor
//!
//! ```bash
//! huff notes.txt -c notes.huff
//! huff notes.huff -x notes.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgGroup, Parser};
use huffpack::{CompressedData, CompressionStats, HuffmanCodec, HuffmanError, Result};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "huff", version, about = "Static Huffman file compressor")]
#[command(group(ArgGroup::new("mode").required(true).args(["compress", "extract"])))]
struct Args {
    /// File to read
    input: PathBuf,

    /// File to write
    output: PathBuf,

    /// Compress INPUT into OUTPUT
    #[arg(short = 'c', long)]
    compress: bool,

    /// Extract a compressed INPUT into OUTPUT
    #[arg(short = 'x', long)]
    extract: bool,

    /// Print the Huffman tree and code table to stderr
    #[arg(long)]
    dump_tree: bool,

    /// Log progress (honours RUST_LOG)
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn init_tracing(args: &Args) {
    let filter = if args.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if args.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let stats = if args.compress {
        compress(&args.input, &args.output, args.dump_tree)?
    } else {
        extract(&args.input, &args.output, args.dump_tree)?
    };
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        original = stats.original_bytes,
        compressed = stats.compressed_bytes,
        "done"
    );
    Ok(())
}

fn compress(input: &Path, output: &Path, dump_tree: bool) -> Result<CompressionStats> {
    let data = fs::read(input).map_err(|e| HuffmanError::file(input, e))?;
    let codec = HuffmanCodec::from_bytes(&data)?;
    if dump_tree {
        dump(&codec);
    }

    let compressed = codec.encode(&data)?;
    let bytes = compressed.serialize()?;
    fs::write(output, &bytes).map_err(|e| HuffmanError::file(output, e))?;

    Ok(CompressionStats {
        original_bytes: data.len() as u64,
        compressed_bytes: bytes.len() as u64,
    })
}

fn extract(input: &Path, output: &Path, dump_tree: bool) -> Result<CompressionStats> {
    let bytes = fs::read(input).map_err(|e| HuffmanError::file(input, e))?;
    let compressed = CompressedData::deserialize(&bytes)?;
    let codec = HuffmanCodec::new(compressed.frequencies.clone())?;
    if dump_tree {
        dump(&codec);
    }

    let decoded = codec.decode(&compressed.packed)?;
    fs::write(output, &decoded).map_err(|e| HuffmanError::file(output, e))?;

    Ok(CompressionStats {
        original_bytes: decoded.len() as u64,
        compressed_bytes: bytes.len() as u64,
    })
}

fn dump(codec: &HuffmanCodec) {
    match (codec.tree(), codec.table()) {
        (Some(tree), Some(table)) => eprint!("{}\n{}", tree, table),
        (Some(tree), None) => eprint!("{}", tree),
        (None, _) => eprintln!("Huffman Tree Structure: (empty input)"),
    }
}
