//! Final smoothing and encoding.
//!
//! Softens the hard edges left by resizing and noise drawing, then encodes
//! the canvas into an in-memory byte buffer.

use crate::config::{CaptchaError, Result};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::filter::filter3x3;
use std::io::Cursor;

// 3x3 smoothing kernel: neighbors weighted 1, center 5, normalized by 13.
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

/// Smooths the canvas and encodes it in the requested raster format.
///
/// # Errors
///
/// Returns `CaptchaError::Render` if the encoder rejects the canvas, which
/// only happens for formats the `image` crate cannot write.
pub fn finish(canvas: &RgbImage, format: ImageFormat) -> Result<Vec<u8>> {
    let smoothed: RgbImage = filter3x3::<Rgb<u8>, f32, u8>(canvas, &SMOOTH_KERNEL);

    let mut out = Cursor::new(Vec::new());
    smoothed
        .write_to(&mut out, format)
        .map_err(|e| CaptchaError::Render(format!("image encode failed: {e}")))?;
    Ok(out.into_inner())
}
