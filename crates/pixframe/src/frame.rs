//! Frame codec: a fixed 32-byte header followed by the stored payload.
//!
//! ```text
//! offset  size  field
//!      0     4  magic            "TALU"
//!      4     2  version          big-endian, always 1
//!      6     2  reserved         zero on encode, ignored on decode
//!      8     4  original_size    payload length before compression
//!     12     4  stored_size      payload length as stored
//!     16    16  digest           SHA-256 of the original payload, first 16 bytes
//!     32     n  payload          stored_size bytes, gzip or raw
//! ```
//!
//! There is no compression flag: a frame is compressed exactly when
//! `stored_size != original_size`.

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::compression::{compress, decompress, looks_compressed};
use crate::{PixframeError, Result};

/// Identifies a pixframe frame.
pub const MAGIC: [u8; 4] = *b"TALU";
/// The only frame version this implementation reads or writes.
pub const VERSION: u16 = 1;
/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 32;
/// Length of the truncated integrity digest.
pub const DIGEST_LEN: usize = 16;
/// Largest payload the 32-bit size fields can describe.
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize;

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Format version, always [`VERSION`] for a parsed header
    pub version: u16,
    /// Forward-compatibility slot, not interpreted
    pub reserved: u16,
    /// Payload length before compression
    pub original_size: u32,
    /// Payload length as stored in the frame
    pub stored_size: u32,
    /// First 16 bytes of the SHA-256 of the original payload
    pub digest: [u8; DIGEST_LEN],
}

impl FrameHeader {
    /// Header describing `original` stored as `stored`.
    pub fn new(original: &[u8], stored: &[u8]) -> Result<Self> {
        Ok(Self {
            version: VERSION,
            reserved: 0,
            original_size: size_field(original.len())?,
            stored_size: size_field(stored.len())?,
            digest: digest(original),
        })
    }

    /// Parse and validate the header at the start of `data`.
    ///
    /// Only the header itself is checked; the payload may still be truncated.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(PixframeError::TooSmall {
                len: data.len(),
                required: HEADER_SIZE,
            });
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if magic != MAGIC {
            return Err(PixframeError::BadMagic { found: magic });
        }

        let version = u16::from_be_bytes([data[4], data[5]]);
        if version != VERSION {
            return Err(PixframeError::UnsupportedVersion {
                found: version,
                supported: VERSION,
            });
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&data[16..HEADER_SIZE]);

        Ok(Self {
            version,
            reserved: u16::from_be_bytes([data[6], data[7]]),
            original_size: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
            stored_size: u32::from_be_bytes([data[12], data[13], data[14], data[15]]),
            digest,
        })
    }

    /// Serialize to the fixed big-endian layout.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..6].copy_from_slice(&self.version.to_be_bytes());
        out[6..8].copy_from_slice(&self.reserved.to_be_bytes());
        out[8..12].copy_from_slice(&self.original_size.to_be_bytes());
        out[12..16].copy_from_slice(&self.stored_size.to_be_bytes());
        out[16..HEADER_SIZE].copy_from_slice(&self.digest);
        out
    }

    /// Whether the payload is stored compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.stored_size != self.original_size
    }

    /// Total frame length: header plus stored payload.
    #[inline]
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.stored_size as usize
    }
}

/// First [`DIGEST_LEN`] bytes of the SHA-256 of `data`.
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let full = Sha256::digest(data);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&full[..DIGEST_LEN]);
    out
}

/// Build a frame around `payload`.
///
/// With `use_compression` the payload is gzipped and the compressed bytes are
/// stored even if they are not smaller than the input.
///
/// # Errors
///
/// [`PixframeError::EmptyPayload`] for an empty payload,
/// [`PixframeError::PayloadTooLarge`] if a size does not fit in 32 bits.
#[must_use = "this returns the framed bytes"]
pub fn encode_frame(payload: &[u8], use_compression: bool) -> Result<Vec<u8>> {
    if payload.is_empty() {
        return Err(PixframeError::EmptyPayload);
    }
    size_field(payload.len())?;

    let compressed;
    let stored: &[u8] = if use_compression {
        compressed = compress(payload)?;
        if compressed.len() == payload.len() {
            warn!(
                len = payload.len(),
                "compressed payload has the same length as the original"
            );
        }
        &compressed
    } else {
        payload
    };

    let header = FrameHeader::new(payload, stored)?;
    debug!(
        original = header.original_size,
        stored = header.stored_size,
        compressed = use_compression,
        "encoded frame"
    );

    let mut out = Vec::with_capacity(header.frame_len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(stored);
    Ok(out)
}

/// Validate a frame and return the original payload.
///
/// Bytes after the declared payload (raster padding) are ignored.
#[must_use = "this returns the decoded payload"]
pub fn decode_frame(framed: &[u8]) -> Result<Vec<u8>> {
    let header = FrameHeader::parse(framed)?;

    let declared = header.stored_size as usize;
    let available = framed.len() - HEADER_SIZE;
    if available < declared {
        return Err(PixframeError::Truncated {
            declared,
            available,
        });
    }
    let payload = &framed[HEADER_SIZE..HEADER_SIZE + declared];

    if header.is_compressed() {
        let original = decompress(payload, header.original_size as usize)?;
        verify(&original, &header.digest)?;
        debug!(
            original = header.original_size,
            stored = header.stored_size,
            "decoded compressed frame"
        );
        return Ok(original);
    }

    match verify(payload, &header.digest) {
        Ok(()) => {
            debug!(len = declared, "decoded raw frame");
            Ok(payload.to_vec())
        }
        // Equal sizes can also mean compression produced exactly the input
        // length. Only accept that reading if the digest agrees.
        Err(err) if looks_compressed(payload) => {
            match decompress(payload, header.original_size as usize) {
                Ok(original) if digest(&original) == header.digest => {
                    warn!(
                        len = declared,
                        "equal-size frame verified only after inflation"
                    );
                    Ok(original)
                }
                _ => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

fn verify(data: &[u8], expected: &[u8; DIGEST_LEN]) -> Result<()> {
    let actual = digest(data);
    if actual != *expected {
        return Err(PixframeError::ChecksumMismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(())
}

fn size_field(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| PixframeError::PayloadTooLarge {
        len,
        max: MAX_PAYLOAD_LEN,
    })
}
