//! Decoding and downsampling stages of the compression pipeline.
//!
//! This module provides functionality for:
//! - Decoding any raster format enabled in the `image` crate (content-sniffed)
//! - Applying EXIF orientation so pixels come out upright
//! - Computing and applying the dimension limit
//!
//! All operations are synchronous; callers in a server context should run
//! them off the request-handling thread.
//!
//! # Examples
//!
//! ```ignore
//! use fitpress_core::decode::{decode_image, resize_to_fit, FilterType};
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! let fitted = resize_to_fit(&image, 2048, FilterType::Bilinear).unwrap();
//! println!("{}x{} -> {}x{}", image.width, image.height, fitted.width, fitted.height);
//! ```

mod raster;
mod resize;
mod types;

pub use raster::{decode_image, get_orientation};
pub use resize::{fit_dimensions, resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
