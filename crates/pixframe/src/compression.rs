//! Gzip helpers for frame payloads.

use std::io::{Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::{PixframeError, Result};

/// Leading bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Deflate cannot expand input by more than about 1032:1.
const MAX_INFLATE_RATIO: usize = 1032;

/// Gzip `data` with the default compression level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(data.len() / 2 + 32),
        Compression::default(),
    );
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate a gzip stream that must expand to exactly `expected_len` bytes.
///
/// Reading stops one byte past `expected_len`, so a stream that claims a
/// small size but inflates to a huge one is rejected without allocating it.
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(initial_capacity(data.len(), expected_len));
    GzDecoder::new(data)
        .take(expected_len as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| PixframeError::DecompressionFailed(e.to_string()))?;

    if out.len() != expected_len {
        let got = if out.len() > expected_len {
            format!("more than {expected_len}")
        } else {
            out.len().to_string()
        };
        return Err(PixframeError::DecompressionFailed(format!(
            "inflated to {got} bytes, header declares {expected_len}"
        )));
    }
    Ok(out)
}

/// Up-front reservation for inflating `stored_len` bytes. `expected_len`
/// comes from an untrusted header, so it is capped by what the stream could
/// actually produce.
fn initial_capacity(stored_len: usize, expected_len: usize) -> usize {
    expected_len.min(stored_len.saturating_mul(MAX_INFLATE_RATIO))
}

/// Whether `data` starts like a gzip stream.
#[inline]
pub fn looks_compressed(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}
