//! Inputs, outputs and errors of a compression call.

use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::config::{QualityLevel, DEFAULT_BUDGET_BYTES};
use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Media type of every re-encoded result.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Failure of a compression call. No partial output accompanies either kind.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// The input is not a decodable image. The caller can fix this.
    #[error("Failed to decode source image: {0}")]
    DecodeFailed(#[from] DecodeError),

    /// The encoder malfunctioned. Infrastructure problem, not retried here.
    #[error("Failed to encode JPEG: {0}")]
    EncodeFailed(#[from] EncodeError),
}

impl CompressionError {
    /// True when the failure stems from the supplied bytes rather than the encoder.
    pub fn is_user_error(&self) -> bool {
        matches!(self, CompressionError::DecodeFailed(_))
    }
}

/// Returns true for media types that denote baseline JPEG data.
///
/// Comparison is case-insensitive and ignores parameters after `;`.
pub fn is_jpeg_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    ["image/jpeg", "image/jpg", "image/pjpeg"]
        .iter()
        .any(|candidate| essence.eq_ignore_ascii_case(candidate))
}

/// An image handed to the compressor, with caller-declared metadata.
///
/// The declared media type is trusted only for the fast path; everything
/// else is sniffed from the bytes during decode.
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Vec<u8>,
    media_type: String,
    filename: String,
}

impl SourceImage {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        media_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
            filename: filename.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Byte length of the encoded input.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_jpeg(&self) -> bool {
        is_jpeg_media_type(&self.media_type)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Maximum acceptable output size in bytes. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SizeBudget(NonZeroU64);

impl SizeBudget {
    /// Returns `None` for a zero budget.
    pub fn new(bytes: u64) -> Option<Self> {
        NonZeroU64::new(bytes).map(Self)
    }

    pub fn bytes(self) -> u64 {
        self.0.get()
    }

    /// Whether an output of `len` bytes fits.
    pub fn allows(self, len: usize) -> bool {
        (len as u64) <= self.0.get()
    }
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self(NonZeroU64::MIN.saturating_add(DEFAULT_BUDGET_BYTES - 1))
    }
}

/// A successfully compressed (or passed-through) image.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub bytes: Vec<u8>,
    /// Always [`JPEG_MEDIA_TYPE`].
    pub media_type: String,
    /// Source filename with its extension replaced by `.jpg`.
    pub filename: String,
    pub created_at: DateTime<Utc>,
    /// Quality of the accepted encode; `None` when the input was passed through.
    pub quality: Option<QualityLevel>,
    /// Number of encode passes performed (0 on the fast path).
    pub attempts: u32,
    /// Output pixel dimensions; `None` when the input was passed through undecoded.
    pub dimensions: Option<(u32, u32)>,
    /// The budget this result was produced against.
    pub budget: u64,
    /// False when the floor quality was accepted above budget.
    pub budget_met: bool,
}

impl CompressionResult {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the input bytes were returned unchanged.
    pub fn is_passthrough(&self) -> bool {
        self.attempts == 0
    }
}
