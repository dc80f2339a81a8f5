//! fitpress core - adaptive JPEG re-encoding
//!
//! Takes an arbitrary raster image and a byte budget and returns a JPEG that
//! fits within the budget and a maximum edge length, choosing the encoder
//! quality by a bounded descending search instead of asking the caller.
//!
//! - [`compress`] - the pipeline entry point and its configuration
//! - [`decode`] - format-sniffing decode, EXIF orientation, downscaling
//! - [`encode`] - JPEG encoding at a fixed quality

pub mod compress;
pub mod decode;
pub mod encode;

pub use compress::{
    compress, CompressionConfig, CompressionError, CompressionResult, Compressor, ConfigError,
    QualityLevel, QualitySchedule, SizeBudget, SourceImage,
};
