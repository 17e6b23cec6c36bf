//! Geometric glyph distortion.
//!
//! Applies a random rotation followed by a projective quad warp. The warp
//! is the main OCR-resistance mechanism: after it, a glyph's outline no
//! longer matches any fixed per-character template.

use crate::config::{CaptchaError, RenderConfig, Result};
use crate::render::glyph::crop_to_ink;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp, warp_into};
use rand::Rng;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Rotates then quad-warps a glyph bitmap.
///
/// # Errors
///
/// Returns `CaptchaError::Render` if the perturbed quadrilateral is
/// degenerate, which cannot happen for the bounded offsets used here.
pub fn distort(glyph: &RgbaImage, config: &RenderConfig, rng: &mut impl Rng) -> Result<RgbaImage> {
    let angle = sample_angle(config, rng);
    let rotated = rotate_expand(glyph, angle);
    let rotated = crop_to_ink(&rotated).unwrap_or(rotated);
    quad_warp(&rotated, rng)
}

/// Uniform angle in [-max_rotate_angle, +max_rotate_angle] degrees.
fn sample_angle(config: &RenderConfig, rng: &mut impl Rng) -> f32 {
    rng.random_range(-config.max_rotate_angle..=config.max_rotate_angle)
}

/// Bilinear rotation into a buffer expanded to hold the full rotated image.
fn rotate_expand(glyph: &RgbaImage, angle_deg: f32) -> RgbaImage {
    let (w, h) = glyph.dimensions();
    let (wf, hf) = (w as f32, h as f32);
    let theta = angle_deg.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());

    let out_w = (wf * cos + hf * sin).ceil().max(1.0) as u32;
    let out_h = (wf * sin + hf * cos).ceil().max(1.0) as u32;

    let projection = Projection::translate(out_w as f32 / 2.0, out_h as f32 / 2.0)
        * Projection::rotate(theta)
        * Projection::translate(-wf / 2.0, -hf / 2.0);

    let mut out = RgbaImage::new(out_w, out_h);
    warp_into(glyph, &projection, Interpolation::Bilinear, TRANSPARENT, &mut out);
    out
}

/// Maps the glyph rectangle onto a randomly perturbed quadrilateral.
///
/// Horizontal corner offsets are drawn from ±(10%-30% of width), vertical
/// ones from ±(20%-30% of height). The output buffer grows to
/// `w + |x1| + |x2|` by `h + |y1| + |y2|` so the warped quad stays in frame,
/// and the resample is a projective transform solved from the four corner
/// correspondences.
fn quad_warp(glyph: &RgbaImage, rng: &mut impl Rng) -> Result<RgbaImage> {
    let (w, h) = glyph.dimensions();
    let (wf, hf) = (w as f32, h as f32);

    let dx = wf * rng.random_range(0.1..0.3);
    let dy = hf * rng.random_range(0.2..0.3);
    let x1 = rng.random_range(-dx..=dx).trunc();
    let y1 = rng.random_range(-dy..=dy).trunc();
    let x2 = rng.random_range(-dx..=dx).trunc();
    let y2 = rng.random_range(-dy..=dy).trunc();

    let w2 = wf + x1.abs() + x2.abs();
    let h2 = hf + y1.abs() + y2.abs();
    let resized = imageops::resize(glyph, w2 as u32, h2 as u32, FilterType::Triangle);

    // Corner order: NW, SW, SE, NE.
    let quad = [
        (x1, y1),
        (-x1, h2 - y2),
        (w2 + x2, h2 + y2),
        (w2 - x2, -y1),
    ];
    let rect = [(0.0, 0.0), (0.0, h2), (w2, h2), (w2, 0.0)];
    let projection = Projection::from_control_points(quad, rect)
        .ok_or_else(|| CaptchaError::Render("degenerate warp quadrilateral".to_string()))?;

    Ok(warp(&resized, &projection, Interpolation::Bilinear, TRANSPARENT))
}
