//! Adaptive re-encoding of an arbitrary image into a JPEG under a byte budget.
//!
//! # Pipeline
//!
//! 1. **Fast path**: a declared JPEG already within budget is returned byte-for-byte.
//! 2. Decode (any supported format, EXIF orientation applied).
//! 3. Downscale so the longer edge is at most `max_dimension`.
//! 4. Encode at each level of the quality schedule, highest first, and
//!    accept the first output within budget. The floor level is accepted
//!    regardless of size, so the search always ends with an answer.
//!
//! With the default schedule (0.9 down to 0.1 in steps of 0.1) a call
//! performs at most 9 encode passes.
//!
//! # Examples
//!
//! ```ignore
//! use fitpress_core::compress::{compress, SizeBudget, SourceImage};
//!
//! let bytes = std::fs::read("scan.png").unwrap();
//! let source = SourceImage::new(bytes, "image/png", "scan.png");
//! let result = compress(source, SizeBudget::default()).unwrap();
//! assert_eq!(result.filename, "scan.jpg");
//! ```

mod config;
mod filename;
mod types;

pub use config::{
    CompressionConfig, ConfigError, QualityLevel, QualitySchedule, DEFAULT_BUDGET_BYTES,
    DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY_FLOOR, DEFAULT_QUALITY_START, DEFAULT_QUALITY_STEP,
    MIN_QUALITY_STEP,
};
pub use filename::jpeg_filename;
pub use types::{
    is_jpeg_media_type, CompressionError, CompressionResult, SizeBudget, SourceImage,
    JPEG_MEDIA_TYPE,
};

use chrono::Utc;
use tracing::{debug, warn};

use crate::decode::{decode_image, resize_to_fit, DecodedImage};
use crate::encode::{encode_image, EncodeError};

/// Produces encoded bytes for an image at a given quality level.
///
/// The compressor only relies on output size shrinking as quality drops;
/// it never inspects the bytes.
pub trait QualityEncoder {
    fn encode(&self, image: &DecodedImage, quality: QualityLevel) -> Result<Vec<u8>, EncodeError>;
}

/// Baseline JPEG through the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegQualityEncoder;

impl QualityEncoder for JpegQualityEncoder {
    fn encode(&self, image: &DecodedImage, quality: QualityLevel) -> Result<Vec<u8>, EncodeError> {
        encode_image(image, quality.encoder_quality())
    }
}

/// Compress `source` under `budget` with the default configuration.
pub fn compress(
    source: SourceImage,
    budget: SizeBudget,
) -> Result<CompressionResult, CompressionError> {
    Compressor::<JpegQualityEncoder>::default().compress(source, budget)
}

/// A validated configuration bound to an encoder.
///
/// Holds no per-call state; one instance can serve any number of calls,
/// from several threads when the encoder is `Sync`.
#[derive(Debug, Clone)]
pub struct Compressor<E = JpegQualityEncoder> {
    config: CompressionConfig,
    levels: Vec<QualityLevel>,
    encoder: E,
}

impl Default for Compressor {
    fn default() -> Self {
        let config = CompressionConfig::default();
        let levels = config.quality.levels();
        Self {
            config,
            levels,
            encoder: JpegQualityEncoder,
        }
    }
}

impl Compressor {
    pub fn new(config: CompressionConfig) -> Result<Self, ConfigError> {
        Self::with_encoder(config, JpegQualityEncoder)
    }
}

struct Accepted {
    bytes: Vec<u8>,
    quality: QualityLevel,
    attempts: u32,
}

impl<E: QualityEncoder> Compressor<E> {
    /// Build a compressor around a custom encoder.
    pub fn with_encoder(config: CompressionConfig, encoder: E) -> Result<Self, ConfigError> {
        config.validate()?;
        let levels = config.quality.levels();
        Ok(Self {
            config,
            levels,
            encoder,
        })
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Quality levels tried, highest first.
    pub fn levels(&self) -> &[QualityLevel] {
        &self.levels
    }

    /// The configured default budget.
    pub fn default_budget(&self) -> SizeBudget {
        SizeBudget::new(self.config.default_budget).unwrap_or_default()
    }

    /// Compress against the configured default budget.
    pub fn compress_default(
        &self,
        source: SourceImage,
    ) -> Result<CompressionResult, CompressionError> {
        self.compress(source, self.default_budget())
    }

    /// Re-encode `source` as a JPEG within `budget` and the dimension limit.
    ///
    /// # Errors
    ///
    /// * `CompressionError::DecodeFailed` if the bytes are not a decodable image.
    /// * `CompressionError::EncodeFailed` if any encode pass errors or yields no bytes.
    ///
    /// Exceeding the budget at the floor quality is not an error; check
    /// `CompressionResult::budget_met`.
    pub fn compress(
        &self,
        source: SourceImage,
        budget: SizeBudget,
    ) -> Result<CompressionResult, CompressionError> {
        let filename = jpeg_filename(source.filename());

        if source.is_jpeg() && budget.allows(source.len()) {
            debug!(
                size = source.len(),
                budget = budget.bytes(),
                "JPEG already within budget, passing through"
            );
            return Ok(CompressionResult {
                bytes: source.into_bytes(),
                media_type: JPEG_MEDIA_TYPE.to_string(),
                filename,
                created_at: Utc::now(),
                quality: None,
                attempts: 0,
                dimensions: None,
                budget: budget.bytes(),
                budget_met: true,
            });
        }

        let decoded = decode_image(source.bytes())?;
        drop(source);

        let fitted = resize_to_fit(&decoded, self.config.max_dimension, self.config.filter)?;
        if (fitted.width, fitted.height) != (decoded.width, decoded.height) {
            debug!(
                "Downscaled {}x{} to {}x{}",
                decoded.width, decoded.height, fitted.width, fitted.height
            );
        }
        drop(decoded);

        let accepted = self.search(&fitted, budget)?;
        let budget_met = budget.allows(accepted.bytes.len());
        if !budget_met {
            warn!(
                size = accepted.bytes.len(),
                budget = budget.bytes(),
                quality = %accepted.quality,
                "Floor quality reached without meeting budget, returning best effort"
            );
        }

        Ok(CompressionResult {
            bytes: accepted.bytes,
            media_type: JPEG_MEDIA_TYPE.to_string(),
            filename,
            created_at: Utc::now(),
            quality: Some(accepted.quality),
            attempts: accepted.attempts,
            dimensions: Some((fitted.width, fitted.height)),
            budget: budget.bytes(),
            budget_met,
        })
    }

    fn search(&self, image: &DecodedImage, budget: SizeBudget) -> Result<Accepted, EncodeError> {
        let floor_index = self.levels.len().saturating_sub(1);

        for (index, &quality) in self.levels.iter().enumerate() {
            let bytes = self.encoder.encode(image, quality)?;
            if bytes.is_empty() {
                return Err(EncodeError::EmptyOutput {
                    quality: quality.encoder_quality(),
                });
            }

            debug!(
                quality = %quality,
                size = bytes.len(),
                budget = budget.bytes(),
                "Encode attempt"
            );

            if budget.allows(bytes.len()) || index == floor_index {
                return Ok(Accepted {
                    bytes,
                    quality,
                    attempts: index as u32 + 1,
                });
            }
        }

        Err(EncodeError::EncodingFailed(
            "quality schedule has no levels".to_string(),
        ))
    }
}
