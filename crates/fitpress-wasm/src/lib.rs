//! fitpress WASM - WebAssembly bindings for fitpress
//!
//! Lets a browser page shrink a user-picked image to an upload budget
//! before sending it anywhere.
//!
//! # Module Structure
//!
//! - `compress` - `compress_image` and friends
//! - `types` - `JsCompressionResult`, the JS-facing result wrapper
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_image } from '@fitpress/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_image(bytes, file.type, file.name, 2 * 1024 * 1024);
//! console.log(`${result.filename}: ${result.byte_length} bytes at q=${result.quality}`);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod types;

pub use compress::{compress_image, compress_image_with_config, default_config};
pub use types::JsCompressionResult;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Default byte budget (2 MiB), for callers that want to show it.
#[wasm_bindgen]
pub fn default_budget() -> f64 {
    fitpress_core::compress::DEFAULT_BUDGET_BYTES as f64
}
