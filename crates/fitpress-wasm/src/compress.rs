//! Compression WASM bindings.
//!
//! # Functions
//!
//! - [`compress_image`] - Compress with the default configuration
//! - [`compress_image_with_config`] - Compress with a configuration object
//! - [`default_config`] - The default configuration as a plain object
//!
//! # Example
//!
//! ```typescript
//! import { compress_image } from '@fitpress/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_image(bytes, file.type, file.name); // 2 MiB budget
//! const blob = new Blob([result.take_bytes()], { type: result.media_type });
//! upload(new File([blob], result.filename, { lastModified: result.timestamp_ms }));
//! ```
//!
//! Failures throw an `Error` whose `name` is `DecodeFailed` (bad input,
//! show to the user), `EncodeFailed` (retry later) or `InvalidArgument`.

use fitpress_core::{
    CompressionConfig, CompressionError, CompressionResult, Compressor, SizeBudget, SourceImage,
};
use wasm_bindgen::prelude::*;

use crate::types::JsCompressionResult;

/// Failure of a binding call before it is converted to a JS `Error`.
#[derive(Debug)]
pub(crate) enum BindingError {
    InvalidArgument(String),
    Compression(CompressionError),
}

impl BindingError {
    fn name(&self) -> &'static str {
        match self {
            BindingError::InvalidArgument(_) => "InvalidArgument",
            BindingError::Compression(CompressionError::DecodeFailed(_)) => "DecodeFailed",
            BindingError::Compression(CompressionError::EncodeFailed(_)) => "EncodeFailed",
        }
    }

    fn message(&self) -> String {
        match self {
            BindingError::InvalidArgument(msg) => msg.clone(),
            BindingError::Compression(e) => e.to_string(),
        }
    }

    fn into_js(self) -> JsValue {
        let err = js_sys::Error::new(&self.message());
        err.set_name(self.name());
        err.into()
    }
}

/// Compress an image with the default configuration.
///
/// # Arguments
///
/// * `bytes` - The encoded source image
/// * `media_type` - Declared type (e.g. `File.type`); only used for the JPEG fast path
/// * `filename` - Source name; the result is named with a `.jpg` extension
/// * `budget` - Maximum output bytes; defaults to 2 MiB when omitted
///
/// An over-budget result at the lowest quality is still returned; check
/// `budget_met`.
#[wasm_bindgen]
pub fn compress_image(
    bytes: &[u8],
    media_type: &str,
    filename: &str,
    budget: Option<f64>,
) -> Result<JsCompressionResult, JsValue> {
    run(
        bytes,
        media_type,
        filename,
        budget,
        CompressionConfig::default(),
    )
    .map(finish)
    .map_err(BindingError::into_js)
}

/// Compress an image with an explicit configuration object.
///
/// `config` may be partial; missing fields take their defaults:
///
/// ```typescript
/// compress_image_with_config(bytes, file.type, file.name, undefined, {
///   max_dimension: 1024,
///   quality: { start: 0.8, step: 0.1, floor: 0.3 },
///   filter: 'lanczos3',
/// });
/// ```
#[wasm_bindgen]
pub fn compress_image_with_config(
    bytes: &[u8],
    media_type: &str,
    filename: &str,
    budget: Option<f64>,
    config: JsValue,
) -> Result<JsCompressionResult, JsValue> {
    let config: CompressionConfig = if config.is_undefined() || config.is_null() {
        CompressionConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| {
            BindingError::InvalidArgument(format!("invalid config: {}", e)).into_js()
        })?
    };

    run(bytes, media_type, filename, budget, config)
        .map(finish)
        .map_err(BindingError::into_js)
}

/// The default configuration as a plain object.
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&CompressionConfig::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn finish(result: CompressionResult) -> JsCompressionResult {
    if !result.budget_met {
        warn_console(&format!(
            "fitpress: {} is {} bytes, over the {} byte budget at the lowest quality",
            result.filename,
            result.bytes.len(),
            result.budget
        ));
    }
    JsCompressionResult::from_result(result)
}

#[cfg(target_arch = "wasm32")]
fn warn_console(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn_console(_message: &str) {}

/// Target-independent core of the bindings, kept free of `JsValue`.
pub(crate) fn run(
    bytes: &[u8],
    media_type: &str,
    filename: &str,
    budget: Option<f64>,
    config: CompressionConfig,
) -> Result<CompressionResult, BindingError> {
    let compressor = Compressor::new(config)
        .map_err(|e| BindingError::InvalidArgument(format!("invalid config: {}", e)))?;

    let budget = match budget {
        Some(value) => budget_from_f64(value)?,
        None => compressor.default_budget(),
    };

    let source = SourceImage::new(bytes, media_type, filename);
    compressor
        .compress(source, budget)
        .map_err(BindingError::Compression)
}

/// JS numbers are doubles; accept whole positive values up to 2^53.
fn budget_from_f64(value: f64) -> Result<SizeBudget, BindingError> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if !value.is_finite() || value.fract() != 0.0 || !(1.0..=MAX_SAFE_INTEGER).contains(&value) {
        return Err(BindingError::InvalidArgument(format!(
            "budget must be a positive whole number of bytes, got {}",
            value
        )));
    }

    SizeBudget::new(value as u64).ok_or_else(|| {
        BindingError::InvalidArgument(format!("budget must be positive, got {}", value))
    })
}
