//! Command-line surface for the tilepress codec.
//!
//! Compresses a bitmap to `<input>.compressed.<quality>` or, when the
//! input path contains `.compressed.`, decompresses it back to
//! `<stem>.uncompressed.<quality>.bmp`. Quality is a fixed constant;
//! block size and subsampling ratio are compile-time constants of the
//! core crate.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use tilepress_core::{compress, uncompress, CompressedImage, Matrix};

const COMPRESSION_QUALITY: u8 = 70;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input image file. Bitmaps are compressed; files whose name
    /// contains `.compressed.` are decompressed.
    input: PathBuf,
}

fn compress_file(path: &Path) -> Result<()> {
    let img = image::open(path)
        .with_context(|| format!("failed to read image {}", path.display()))?
        .to_rgb8();
    let matrix = Matrix::from_rgb_image(&img)
        .context("image is smaller than one 16x16 macroblock")?;
    info!(
        "{}x{} pixels, {}x{} after cropping to the macroblock grid",
        img.width(),
        img.height(),
        matrix.width(),
        matrix.height()
    );

    let started = Instant::now();
    let compressed = compress(&matrix, COMPRESSION_QUALITY)?;
    info!("compression took {:.2?}", started.elapsed());

    let output = PathBuf::from(format!(
        "{}.compressed.{}",
        path.display(),
        COMPRESSION_QUALITY
    ));
    compressed.save(&output)?;
    info!(
        "wrote {} ({} payload bytes)",
        output.display(),
        compressed.payload_len()
    );
    Ok(())
}

fn uncompress_file(path: &Path) -> Result<()> {
    let compressed = CompressedImage::load(path)
        .with_context(|| format!("failed to load container {}", path.display()))?;
    info!(
        "{}x{} container at quality {}",
        compressed.width, compressed.height, compressed.quality
    );

    let started = Instant::now();
    let matrix = uncompress(&compressed)?;
    info!("decompression took {:.2?}", started.elapsed());

    let name = path
        .to_string_lossy()
        .replace(".compressed.", ".uncompressed.");
    let output = PathBuf::from(format!("{}.bmp", name));
    matrix
        .to_rgb_image()
        .save(&output)
        .with_context(|| format!("failed to write bitmap {}", output.display()))?;
    info!("wrote {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.input.to_string_lossy().contains(".compressed.") {
        uncompress_file(&args.input)
    } else {
        compress_file(&args.input)
    }
}
