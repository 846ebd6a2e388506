//! pixframe - Pack files into PNG images and back
//!
//! A command-line tool for storing arbitrary bytes in the pixels of a PNG.

use clap::{Parser, Subcommand};
use pixframe::frame::FrameHeader;
use pixframe::{decode_frame, derasterize, encode_bytes_to_image, load_image, EncodeOptions};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pixframe")]
#[command(version)]
#[command(about = "Store arbitrary bytes losslessly inside PNG images", long_about = None)]
struct Cli {
    /// Print debug diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a file into a PNG image
    Encode {
        /// Input file (use - for stdin)
        input: PathBuf,

        /// Output PNG file (default: input with .png appended)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store the payload without gzip compression
        #[arg(long)]
        no_compress: bool,

        /// Write an RGB image without an alpha channel
        #[arg(long)]
        rgb: bool,
    },

    /// Extract the payload from a PNG image
    Decode {
        /// Input PNG file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the frame header of a PNG image and verify its payload
    Inspect {
        /// Input PNG file
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Encode {
            input,
            output,
            no_compress,
            rgb,
        } => {
            let payload = if is_stdin(&input) {
                let mut buf = Vec::new();
                io::stdin().read_to_end(&mut buf)?;
                buf
            } else {
                fs::read(&input)
                    .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?
            };

            let output_path = match output {
                Some(path) => path,
                None if is_stdin(&input) => {
                    return Err("an output path is required when reading from stdin".into())
                }
                None => {
                    let mut name = input.clone().into_os_string();
                    name.push(".png");
                    PathBuf::from(name)
                }
            };

            let opts = EncodeOptions {
                compression: !no_compress,
                alpha: !rgb,
            };

            eprintln!(
                "Encoding {} bytes (compression {})",
                payload.len(),
                if opts.compression { "on" } else { "off" }
            );

            encode_bytes_to_image(&payload, &output_path, &opts)
                .map_err(|e| format!("Failed to encode '{}': {}", output_path.display(), e))?;

            eprintln!("Written '{}'", output_path.display());
        }

        Commands::Decode { input, output } => {
            let payload = pixframe::decode_bytes_from_image(&input)
                .map_err(|e| format!("Failed to decode '{}': {}", input.display(), e))?;

            match output {
                Some(path) => {
                    fs::write(&path, &payload)?;
                    eprintln!("Written {} bytes to '{}'", payload.len(), path.display());
                }
                None => {
                    io::stdout().write_all(&payload)?;
                }
            }
        }

        Commands::Inspect { input } => {
            let image = load_image(&input)
                .map_err(|e| format!("Failed to open '{}': {}", input.display(), e))?;
            let bytes = derasterize(&image)?;
            let header = FrameHeader::parse(&bytes)?;

            println!("image:          {}x{} {:?}", image.width(), image.height(), image.color());
            println!("capacity:       {} bytes", bytes.len());
            println!("version:        {}", header.version);
            println!("original size:  {} bytes", header.original_size);
            println!("stored size:    {} bytes", header.stored_size);
            println!("compressed:     {}", header.is_compressed());
            println!("digest:         {}", hex::encode(header.digest));

            match decode_frame(&bytes) {
                Ok(_) => println!("status:         ok"),
                Err(e) => println!("status:         {e}"),
            }
        }
    }

    Ok(())
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}
