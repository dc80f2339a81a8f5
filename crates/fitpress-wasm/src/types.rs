//! WASM-compatible wrapper types for compression results.

use fitpress_core::CompressionResult;
use wasm_bindgen::prelude::*;

/// A compressed image handed back to JavaScript.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. `bytes()` copies them into a
/// `Uint8Array`; `take_bytes()` moves them out and leaves the wrapper empty,
/// which avoids holding two copies of a multi-megabyte buffer.
#[wasm_bindgen]
pub struct JsCompressionResult {
    inner: CompressionResult,
}

#[wasm_bindgen]
impl JsCompressionResult {
    /// Encoded image bytes (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    /// Move the encoded bytes out of WASM memory.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.inner.bytes)
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.bytes.len()
    }

    /// Always "image/jpeg".
    #[wasm_bindgen(getter)]
    pub fn media_type(&self) -> String {
        self.inner.media_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.inner.filename.clone()
    }

    /// Milliseconds since the Unix epoch at which the result was built.
    #[wasm_bindgen(getter)]
    pub fn timestamp_ms(&self) -> f64 {
        self.inner.created_at.timestamp_millis() as f64
    }

    /// The creation time as a JavaScript `Date`.
    pub fn created_at(&self) -> js_sys::Date {
        js_sys::Date::new(&JsValue::from_f64(self.timestamp_ms()))
    }

    /// Accepted quality (0-1), or undefined when the input passed through.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> Option<f32> {
        self.inner.quality.map(|q| q.value())
    }

    #[wasm_bindgen(getter)]
    pub fn attempts(&self) -> u32 {
        self.inner.attempts
    }

    /// Output width, or undefined when the input passed through undecoded.
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> Option<u32> {
        self.inner.dimensions.map(|(w, _)| w)
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> Option<u32> {
        self.inner.dimensions.map(|(_, h)| h)
    }

    #[wasm_bindgen(getter)]
    pub fn budget(&self) -> f64 {
        self.inner.budget as f64
    }

    /// False when the lowest quality still exceeded the budget.
    #[wasm_bindgen(getter)]
    pub fn budget_met(&self) -> bool {
        self.inner.budget_met
    }
}

impl JsCompressionResult {
    pub(crate) fn from_result(inner: CompressionResult) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitpress_core::QualityLevel;

    fn sample() -> CompressionResult {
        CompressionResult {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            media_type: "image/jpeg".to_string(),
            filename: "scan.jpg".to_string(),
            created_at: chrono_epoch_plus(1_700_000_000_123),
            quality: Some(QualityLevel::new(0.7)),
            attempts: 3,
            dimensions: Some((640, 480)),
            budget: 4096,
            budget_met: true,
        }
    }

    fn chrono_epoch_plus(ms: i64) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_getters() {
        let result = JsCompressionResult::from_result(sample());
        assert_eq!(result.byte_length(), 4);
        assert_eq!(result.media_type(), "image/jpeg");
        assert_eq!(result.filename(), "scan.jpg");
        assert_eq!(result.timestamp_ms(), 1_700_000_000_123.0);
        assert_eq!(result.quality(), Some(0.7));
        assert_eq!(result.attempts(), 3);
        assert_eq!((result.width(), result.height()), (Some(640), Some(480)));
        assert_eq!(result.budget(), 4096.0);
        assert!(result.budget_met());
    }

    #[test]
    fn test_take_bytes_empties_wrapper() {
        let mut result = JsCompressionResult::from_result(sample());
        assert_eq!(result.take_bytes(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(result.byte_length(), 0);
    }
}
