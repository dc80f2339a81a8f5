//! Downsampling to the output dimension limit.
//!
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target edge is zero, and
/// `DecodeError::CorruptedFile` if the source buffer does not match its dimensions.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let view = image.as_rgb_image().ok_or_else(|| {
        DecodeError::CorruptedFile(format!(
            "pixel buffer of {} bytes does not match {}x{}",
            image.pixels.len(),
            image.width,
            image.height
        ))
    })?;

    let resized = image::imageops::resize(&view, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Resize an image so that neither edge exceeds `max_edge`, preserving aspect ratio.
///
/// Images that already fit are returned unchanged (never upscaled). Target
/// dimensions come from [`fit_dimensions`].
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if `max_edge` is zero.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: max_edge,
            height: max_edge,
        });
    }

    let (width, height) = fit_dimensions(image.width, image.height, max_edge);
    resize(image, width, height, filter)
}

/// Compute output dimensions for a `width` x `height` image under `max_edge`.
///
/// When either edge exceeds the limit both are multiplied by
/// `max_edge / max(width, height)` and rounded half-up, never below 1. The
/// longer edge lands on `max_edge` exactly. Otherwise the input is returned.
pub fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let longest = width.max(height);
    if longest <= max_edge {
        return (width, height);
    }

    let ratio = max_edge as f64 / longest as f64;
    let scale = |edge: u32| -> u32 {
        if edge == longest {
            max_edge
        } else {
            // f64::round is half-away-from-zero, which is half-up for positive values
            ((edge as f64 * ratio).round() as u32).clamp(1, max_edge)
        }
    };

    (scale(width), scale(height))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the longer output edge never exceeds the limit, and equals it when scaling happened.
        #[test]
        fn prop_fit_respects_limit(
            width in 1u32..=20_000,
            height in 1u32..=20_000,
            max_edge in 1u32..=4096,
        ) {
            let (w, h) = fit_dimensions(width, height, max_edge);
            prop_assert!(w >= 1 && h >= 1);
            prop_assert!(w.max(h) <= max_edge);

            if width.max(height) > max_edge {
                prop_assert_eq!(w.max(h), max_edge);
            } else {
                prop_assert_eq!((w, h), (width, height));
            }
        }

        /// Property: aspect ratio is preserved within one pixel on the shorter edge.
        #[test]
        fn prop_fit_preserves_aspect_ratio(
            width in 1u32..=20_000,
            height in 1u32..=20_000,
        ) {
            let (w, h) = fit_dimensions(width, height, 2048);

            // Expected shorter edge given the exact longer edge
            let (expected_h, expected_w) = (
                w as f64 * height as f64 / width as f64,
                h as f64 * width as f64 / height as f64,
            );
            if width >= height {
                prop_assert!((h as f64 - expected_h).abs() <= 1.0, "{}x{} -> {}x{}", width, height, w, h);
            } else {
                prop_assert!((w as f64 - expected_w).abs() <= 1.0, "{}x{} -> {}x{}", width, height, w, h);
            }
        }
    }
}
