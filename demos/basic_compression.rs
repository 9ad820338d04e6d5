use huffpack::HuffmanCodec;
use std::fs::{self, File};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sample_text = "Hello, world! This is a sample text for Huffman compression. \
                      The quick brown fox jumps over the lazy dog. \
                      Huffman encoding is a greedy algorithm that builds optimal prefix codes.";

    let dir = std::env::temp_dir().join(format!("huffpack-demo-{}", std::process::id()));
    fs::create_dir_all(&dir)?;
    let sample_path = dir.join("sample.txt");
    let huff_path = dir.join("sample.huff");
    let out_path = dir.join("decompressed.txt");

    fs::write(&sample_path, sample_text)?;
    println!("Created sample file: {} bytes", sample_text.len());

    let stats = HuffmanCodec::encode_from_file(File::open(&sample_path)?, File::create(&huff_path)?)?;
    println!(
        "Compressed to: {} bytes ({:.1}% of original, header included)",
        stats.compressed_bytes,
        stats.ratio() * 100.0
    );

    HuffmanCodec::decode_from_file(File::open(&huff_path)?, File::create(&out_path)?)?;

    let decompressed_text = fs::read_to_string(&out_path)?;
    fs::remove_dir_all(&dir)?;

    if sample_text != decompressed_text {
        return Err("Decompression verification failed".into());
    }
    println!("Decompression successful! Data matches exactly.");
    Ok(())
}
