//! tqtex CLI Tool
//!
//! Command-line interface for converting Titan Quest TEX textures to PNG.

mod convert;
mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tqtex_core::{DdsHeader, TexContainer};
use tqtex_decoder::{DecodeOptions, TexDecoder};
use tracing::info;

#[derive(Parser)]
#[command(name = "tqtex")]
#[command(about = "Convert Titan Quest .tex texture files to .png images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reject textures wider or taller than this many pixels
    #[arg(long, global = true, default_value = "16384")]
    max_dimension: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every .tex file in a folder
    Convert {
        /// Input directory containing .tex files
        #[arg(short, long, default_value = "import")]
        input: PathBuf,

        /// Output directory for .png files
        #[arg(short, long, default_value = "export")]
        output: PathBuf,

        /// Empty the output directory before converting
        #[arg(long)]
        clean: bool,
    },

    /// Convert a single .tex file
    File {
        /// Input .tex file path
        input: PathBuf,

        /// Output directory, used when --out-file is not given
        #[arg(short, long, default_value = "export")]
        output: PathBuf,

        /// Output .png file path
        #[arg(long)]
        out_file: Option<PathBuf>,
    },

    /// Show TEX and DDS header information
    Info {
        /// Input .tex file path
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let decoder = TexDecoder::new(DecodeOptions {
        max_dimension: cli.max_dimension,
    });

    match cli.command {
        Commands::Convert {
            input,
            output,
            clean,
        } => convert_folder(&decoder, input, output, clean)?,

        Commands::File {
            input,
            output,
            out_file,
        } => convert_single(&decoder, input, output, out_file)?,

        Commands::Info { input, json } => print_info(input, json)?,
    }

    Ok(())
}

fn convert_folder(
    decoder: &TexDecoder,
    input: PathBuf,
    output: PathBuf,
    clean: bool,
) -> Result<()> {
    let summary = convert::convert_folder(decoder, &input, &output, clean)?;
    if summary.converted == 0 && summary.failed.is_empty() {
        println!("No .tex files found in the import folder. Nothing to convert.");
        return Ok(());
    }

    println!("\nConversion complete.");
    println!("Successfully converted: {}", summary.converted);
    println!("Skipped (errors): {}", summary.failed.len());

    if !summary.failed.is_empty() {
        println!("\nThe following files were skipped due to errors:");
        for (name, reason) in &summary.failed {
            println!("  - {}: {}", name, reason);
        }
    }

    Ok(())
}

fn convert_single(
    decoder: &TexDecoder,
    input: PathBuf,
    output: PathBuf,
    out_file: Option<PathBuf>,
) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("File not found: {}", input.display());
    }

    let out_path = out_file.unwrap_or_else(|| convert::default_output_path(&input, &output));
    convert::convert_file(decoder, &input, &out_path)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    info!("Converted {} -> {}", input.display(), out_path.display());
    Ok(())
}

fn print_info(input: PathBuf, json: bool) -> Result<()> {
    let raw = std::fs::read(&input).context("Failed to open TEX file")?;
    let container = TexContainer::parse(&raw).context("Failed to read TEX container")?;
    let dds = DdsHeader::parse(container.dds.as_bytes()).context("Failed to read DDS header")?;

    if json {
        let value = serde_json::json!({
            "file": input.display().to_string(),
            "size": raw.len(),
            "tex": container.header,
            "dds": dds,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("\n=== TEX File Information ===");
    println!("File: {}", input.display());
    println!("Size: {} bytes", raw.len());
    println!("Version: {}", container.header.version.number());
    println!("Metadata: {}", hex(&container.header.metadata));

    println!("\n=== DDS Header ===");
    println!("Resolution: {}x{}", dds.width, dds.height);
    if dds.is_uncompressed() {
        println!("Format: uncompressed, {}-bit", dds.rgb_bit_count);
    } else {
        println!("Format: {}", dds.fourcc);
    }
    println!("Mip levels: {}", dds.mipmap_count.max(1));
    println!("Pixel format flags: 0x{:08X}", dds.pixel_format_flags);

    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_defaults() {
        let cli = Cli::parse_from(["tqtex", "convert"]);
        assert!(!cli.verbose);
        assert_eq!(cli.max_dimension, 16384);
        match cli.command {
            Commands::Convert {
                input,
                output,
                clean,
            } => {
                assert_eq!(input, PathBuf::from("import"));
                assert_eq!(output, PathBuf::from("export"));
                assert!(!clean);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_file_with_out_file() {
        let cli = Cli::parse_from(["tqtex", "-v", "file", "a.tex", "--out-file", "b.png"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::File {
                input, out_file, ..
            } => {
                assert_eq!(input, PathBuf::from("a.tex"));
                assert_eq!(out_file, Some(PathBuf::from("b.png")));
            }
            _ => panic!("expected file"),
        }
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x00, 0xAB, 0x10]), "00 AB 10");
    }
}
