//! # pixframe
//!
//! A lossless container that stores an arbitrary byte payload inside the
//! pixels of a PNG image.
//!
//! ## Features
//!
//! - **Frame codec**: fixed 32-byte header with magic, version, sizes and a
//!   truncated SHA-256 digest, followed by the payload (optionally gzip
//!   compressed).
//! - **Rasterizer**: packs the framed bytes into a near-square RGB grid,
//!   three bytes per pixel, row-major, and reads them back.
//! - **Container I/O**: PNG only; other formats are recognised by their magic
//!   bytes and rejected explicitly.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pixframe::{decode_bytes_from_image, encode_bytes_to_image, EncodeOptions};
//!
//! let payload = b"hello from inside a png";
//! encode_bytes_to_image(payload, "note.png", &EncodeOptions::default())?;
//!
//! let restored = decode_bytes_from_image("note.png")?;
//! assert_eq!(restored, payload);
//! # Ok::<(), pixframe::PixframeError>(())
//! ```
//!
//! The two stages can also be used on their own:
//!
//! ```
//! use pixframe::{decode_frame, derasterize, encode_frame, rasterize, EncodeOptions};
//!
//! let framed = encode_frame(b"abc", false)?;
//! let image = rasterize(&framed, &EncodeOptions::default())?;
//! let bytes = derasterize(&image)?;
//! assert_eq!(decode_frame(&bytes)?, b"abc");
//! # Ok::<(), pixframe::PixframeError>(())
//! ```

use std::path::Path;

use thiserror::Error;

pub mod compression;
pub mod container;
pub mod frame;
pub mod raster;

pub use container::{load_image, load_image_from_memory, save_image, write_png, ContainerFormat};
pub use frame::{decode_frame, encode_frame, FrameHeader};
pub use raster::{choose_dimensions, derasterize, rasterize};

/// Errors that can occur while encoding or decoding a framed image.
#[derive(Debug, Error)]
pub enum PixframeError {
    /// Encode was called with a zero-length payload
    #[error("payload is empty")]
    EmptyPayload,

    /// Payload length does not fit the 32-bit size fields
    #[error("payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// Input is shorter than the fixed header
    #[error("frame too small: {len} bytes, header needs {required}")]
    TooSmall { len: usize, required: usize },

    /// Header declares more payload than is present
    #[error("frame truncated: header declares {declared} payload bytes, {available} available")]
    Truncated { declared: usize, available: usize },

    /// Magic bytes do not identify a pixframe frame
    #[error("bad magic: {}", hex::encode(.found))]
    BadMagic { found: [u8; 4] },

    /// Frame was produced by an incompatible format version
    #[error("unsupported frame version {found} (supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    /// Stored payload could not be inflated
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// Digest of the recovered payload disagrees with the header
    #[error(
        "checksum mismatch: expected {}, got {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    ChecksumMismatch {
        expected: [u8; frame::DIGEST_LEN],
        actual: [u8; frame::DIGEST_LEN],
    },

    /// Image file missing, unreadable or undecodable
    #[error("unreadable image {path}: {reason}")]
    UnreadableImage { path: String, reason: String },

    /// Recognised container that this codec refuses to read
    #[error("unsupported container format: {format}")]
    UnsupportedFormat { format: ContainerFormat },

    /// Image channels are not 8 bits wide
    #[error("unsupported channel depth: {bits} bits per channel (expected 8)")]
    UnsupportedChannelDepth { bits: u16 },

    /// Raster dimensions exceed what the image layer can hold
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pixframe operations.
pub type Result<T> = core::result::Result<T, PixframeError>;

/// Bytes carried by one pixel (R, G, B).
pub const BYTES_PER_PIXEL: usize = 3;

/// Per-call encoding options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Gzip the payload before framing. The stored bytes are the compressed
    /// output even when compression does not shrink them.
    pub compression: bool,

    /// Write an RGBA image with a fully opaque alpha channel instead of RGB.
    pub alpha: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: true,
            alpha: true,
        }
    }
}

impl EncodeOptions {
    /// Options with compression switched on or off and the default layout.
    pub fn with_compression(compression: bool) -> Self {
        Self {
            compression,
            ..Self::default()
        }
    }
}

/// Frame `payload`, rasterize it and write the result as a PNG at `path`.
///
/// # Errors
///
/// Returns [`PixframeError::EmptyPayload`] for an empty payload and
/// [`PixframeError::Io`] if the file cannot be written.
pub fn encode_bytes_to_image(
    payload: &[u8],
    path: impl AsRef<Path>,
    opts: &EncodeOptions,
) -> Result<()> {
    let framed = encode_frame(payload, opts.compression)?;
    let image = rasterize(&framed, opts)?;
    save_image(&image, path)
}

/// Read the PNG at `path` and return the payload it carries.
///
/// Every failure mode of [`load_image`], [`derasterize`] and [`decode_frame`]
/// is surfaced unchanged; a frame is never returned unless its digest
/// verifies.
pub fn decode_bytes_from_image(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let image = load_image(path)?;
    let bytes = derasterize(&image)?;
    decode_frame(&bytes)
}

/// Same as [`encode_bytes_to_image`] but returns the PNG file contents.
pub fn encode_bytes_to_png(payload: &[u8], opts: &EncodeOptions) -> Result<Vec<u8>> {
    let framed = encode_frame(payload, opts.compression)?;
    let image = rasterize(&framed, opts)?;
    let mut png = Vec::new();
    write_png(&image, &mut png)?;
    Ok(png)
}

/// Same as [`decode_bytes_from_image`] but reads PNG file contents from memory.
pub fn decode_bytes_from_png(png: &[u8]) -> Result<Vec<u8>> {
    let image = load_image_from_memory(png)?;
    let bytes = derasterize(&image)?;
    decode_frame(&bytes)
}
