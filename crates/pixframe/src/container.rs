//! Image file I/O.
//!
//! The container format is decided from the file signature, not by a generic
//! auto-detecting decoder. Only PNG is accepted; a lossy or foreign container
//! is rejected before any pixel data is interpreted.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageError, ImageFormat, ImageReader, Limits};
use tracing::debug;

use crate::frame::{HEADER_SIZE, MAX_PAYLOAD_LEN};
use crate::raster::choose_dimensions;
use crate::{PixframeError, Result};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Image containers recognised by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    WebP,
    Tiff,
}

impl ContainerFormat {
    /// Identify the container from the first bytes of a file.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&PNG_SIGNATURE) {
            Some(Self::Png)
        } else if data.starts_with(&[0xff, 0xd8, 0xff]) {
            Some(Self::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if data.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(Self::WebP)
        } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            Some(Self::Tiff)
        } else {
            None
        }
    }

    /// Whether images in this container can carry a frame.
    #[inline]
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::Bmp => "BMP",
            Self::WebP => "WebP",
            Self::Tiff => "TIFF",
        };
        f.write_str(name)
    }
}

/// Write `image` as a PNG file at `path`.
pub fn save_image(image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_png(image, &mut out)?;
    out.flush()?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "saved image"
    );
    Ok(())
}

/// Encode `image` as PNG into `writer`.
pub fn write_png<W: Write>(image: &DynamicImage, writer: W) -> Result<()> {
    image
        .write_with_encoder(PngEncoder::new(writer))
        .map_err(|e| match e {
            ImageError::IoError(io) => PixframeError::Io(io),
            other => PixframeError::Io(std::io::Error::other(other)),
        })
}

/// Read and decode the PNG at `path`.
///
/// Missing or unreadable files are reported as
/// [`PixframeError::UnreadableImage`], as are files whose signature matches
/// no known container.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| PixframeError::UnreadableImage {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    decode_container(&data, &path.display().to_string())
}

/// Decode PNG file contents held in memory.
pub fn load_image_from_memory(data: &[u8]) -> Result<DynamicImage> {
    decode_container(data, "<memory>")
}

fn decode_container(data: &[u8], label: &str) -> Result<DynamicImage> {
    let format = ContainerFormat::detect(data).ok_or_else(|| PixframeError::UnreadableImage {
        path: label.to_string(),
        reason: "unrecognised file signature".to_string(),
    })?;
    if !format.is_supported() {
        return Err(PixframeError::UnsupportedFormat { format });
    }

    let unreadable = |e: ImageError| PixframeError::UnreadableImage {
        path: label.to_string(),
        reason: e.to_string(),
    };
    let mut reader = ImageReader::with_format(Cursor::new(data), ImageFormat::Png);
    reader.limits(decode_limits());
    let image = reader.decode().map_err(unreadable)?;

    let bits = channel_bits(image.color());
    if bits != 8 {
        return Err(PixframeError::UnsupportedChannelDepth { bits });
    }

    debug!(
        source = label,
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "loaded image"
    );
    Ok(image)
}

/// Decoder limits matching the largest image [`crate::rasterize`] can emit.
///
/// The image crate's default allocation cap is far below what a full-size
/// frame needs, so allocation is left unbounded and the grid size is capped
/// instead. The widest grid is the one for a maximum-size frame, and no grid
/// is taller than it is wide.
pub fn decode_limits() -> Limits {
    let (max_side, _) = choose_dimensions(HEADER_SIZE + MAX_PAYLOAD_LEN);
    let max_side = u32::try_from(max_side).unwrap_or(u32::MAX);

    let mut limits = Limits::no_limits();
    limits.max_image_width = Some(max_side);
    limits.max_image_height = Some(max_side);
    limits
}

/// Bits per channel of a decoded color type.
pub(crate) fn channel_bits(color: ColorType) -> u16 {
    color.bytes_per_pixel() as u16 * 8 / color.channel_count() as u16
}
