//! Byte stream <-> RGB pixel grid.
//!
//! Bytes are packed three per pixel in R, G, B order, row-major from the top
//! left. The final pixel is zero-filled when the stream does not end on a pixel
//! boundary, and every pixel after the stream is black. Alpha, when written,
//! is always 255 and never carries data.

use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::debug;

use crate::container::channel_bits;
use crate::{EncodeOptions, PixframeError, Result, BYTES_PER_PIXEL};

/// Smallest near-square grid that holds `byte_count` bytes at three bytes per
/// pixel.
///
/// `width = ceil(sqrt(pixels))`, `height = ceil(pixels / width)`. A zero count
/// still yields a 1x1 grid since an image cannot be empty.
pub fn choose_dimensions(byte_count: usize) -> (usize, usize) {
    let pixels = byte_count.div_ceil(BYTES_PER_PIXEL).max(1);
    let width = ceil_sqrt(pixels);
    let height = pixels.div_ceil(width);
    (width, height)
}

/// Lay `framed` out on a freshly allocated image.
#[must_use = "this returns the rasterized image"]
pub fn rasterize(framed: &[u8], opts: &EncodeOptions) -> Result<DynamicImage> {
    let (width, height) = choose_dimensions(framed.len());
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(PixframeError::InvalidDimensions { width, height }),
    };

    let mut rgb = vec![0u8; width * height * BYTES_PER_PIXEL];
    rgb[..framed.len()].copy_from_slice(framed);

    debug!(
        bytes = framed.len(),
        width,
        height,
        padding = rgb.len() - framed.len(),
        alpha = opts.alpha,
        "rasterized frame"
    );

    let image = if opts.alpha {
        let mut rgba = Vec::with_capacity(width * height * 4);
        for px in rgb.chunks_exact(BYTES_PER_PIXEL) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 0xff]);
        }
        RgbaImage::from_raw(w, h, rgba).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(w, h, rgb).map(DynamicImage::ImageRgb8)
    };
    image.ok_or(PixframeError::InvalidDimensions { width, height })
}

/// Read every pixel back as R, G, B bytes, padding included.
///
/// Alpha is discarded. Images whose channels are not 8 bits wide are rejected
/// rather than truncated.
pub fn derasterize(image: &DynamicImage) -> Result<Vec<u8>> {
    let bytes = match image {
        DynamicImage::ImageRgb8(rgb) => rgb.as_raw().clone(),
        DynamicImage::ImageRgba8(rgba) => {
            let mut out = Vec::with_capacity(rgba.as_raw().len() / 4 * BYTES_PER_PIXEL);
            for px in rgba.as_raw().chunks_exact(4) {
                out.extend_from_slice(&px[..BYTES_PER_PIXEL]);
            }
            out
        }
        other => {
            let bits = channel_bits(other.color());
            if bits != 8 {
                return Err(PixframeError::UnsupportedChannelDepth { bits });
            }
            other.to_rgb8().into_raw()
        }
    };
    Ok(bytes)
}

fn ceil_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root.saturating_mul(root) < n {
        root += 1;
    }
    while root > 1 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dimensions_small_frame() {
        // 32-byte header + 10-byte payload
        assert_eq!(choose_dimensions(42), (4, 4));
    }

    #[test]
    fn test_dimensions_edge_counts() {
        assert_eq!(choose_dimensions(0), (1, 1));
        assert_eq!(choose_dimensions(1), (1, 1));
        assert_eq!(choose_dimensions(3), (1, 1));
        assert_eq!(choose_dimensions(4), (2, 1));
        assert_eq!(choose_dimensions(12), (2, 2));
        assert_eq!(choose_dimensions(13), (3, 2));
        assert_eq!(choose_dimensions(27), (3, 3));
    }

    #[test]
    fn test_dimensions_capacity() {
        for n in 0..5000 {
            let (w, h) = choose_dimensions(n);
            assert!(w * h * BYTES_PER_PIXEL >= n, "n={n} -> {w}x{h}");
            assert!(h <= w, "grid should not be taller than wide: {w}x{h}");
        }
    }

    #[test]
    fn test_ceil_sqrt() {
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(2), 2);
        assert_eq!(ceil_sqrt(4), 2);
        assert_eq!(ceil_sqrt(5), 3);
        assert_eq!(ceil_sqrt(1_000_000), 1000);
        assert_eq!(ceil_sqrt(1_000_001), 1001);
    }

    #[test]
    fn test_rasterize_channel_order() {
        let opts = EncodeOptions {
            compression: false,
            alpha: true,
        };
        let image = rasterize(&[1, 2, 3, 4, 5, 6, 7], &opts).unwrap();
        let rgba = image.to_rgba8();
        assert_eq!((rgba.width(), rgba.height()), (2, 2));
        assert_eq!(rgba.get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(rgba.get_pixel(1, 0).0, [4, 5, 6, 255]);
        assert_eq!(rgba.get_pixel(0, 1).0, [7, 0, 0, 255]);
        assert_eq!(rgba.get_pixel(1, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_rasterize_rgb_layout() {
        let opts = EncodeOptions {
            compression: false,
            alpha: false,
        };
        let image = rasterize(&[9, 8, 7, 6], &opts).unwrap();
        assert!(matches!(image, DynamicImage::ImageRgb8(_)));
        assert_eq!(derasterize(&image).unwrap(), vec![9, 8, 7, 6, 0, 0]);
    }

    #[test]
    fn test_derasterize_keeps_padding() {
        let data: Vec<u8> = (0..=41).collect();
        let image = rasterize(&data, &EncodeOptions::default()).unwrap();
        let bytes = derasterize(&image).unwrap();
        assert_eq!(bytes.len(), 4 * 4 * 3);
        assert_eq!(&bytes[..42], &data[..]);
        assert!(bytes[42..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_derasterize_normalizes_gray() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 1, Luma([17])));
        assert_eq!(derasterize(&gray).unwrap(), vec![17; 6]);
    }

    #[test]
    fn test_derasterize_rejects_16_bit() {
        let deep = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(1, 1, Rgb([1u16, 2, 3])));
        assert!(matches!(
            derasterize(&deep),
            Err(PixframeError::UnsupportedChannelDepth { bits: 16 })
        ));
    }
}
