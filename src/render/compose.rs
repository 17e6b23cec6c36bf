//! Canvas composition.
//!
//! Lays distorted glyphs onto a working canvas with jittered spacing and
//! alpha-masked pasting, then rescales to the configured dimensions.

use crate::config::RenderConfig;
use image::imageops::{self, FilterType};
use image::{RgbImage, RgbaImage};
use rand::Rng;

/// Remaps an antialiased alpha value through the fixed boost curve
/// `min(255, round(a * 1.97))`, pushing semi-transparent edge pixels
/// toward full opacity for bolder strokes.
pub(crate) fn boost_alpha(a: u8) -> u8 {
    ((u32::from(a) * 197 + 50) / 100).min(255) as u8
}

fn blend_channel(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(src) * a + u32::from(dst) * (255 - a) + 127) / 255) as u8
}

/// Composes glyphs left to right onto a background-filled canvas and
/// resizes the result to exactly `config.width` x `config.height`.
///
/// The working canvas is as wide as the glyphs need; the final non-uniform
/// resize deliberately compresses spacing and aspect ratio whenever the
/// glyphs overflow the configured width.
pub fn compose(glyphs: &[RgbaImage], config: &RenderConfig, rng: &mut impl Rng) -> RgbImage {
    let total: u32 = glyphs.iter().map(RgbaImage::width).sum();
    let working_w = total.max(config.width).max(1);
    let mut canvas = RgbImage::from_pixel(working_w, config.height, config.background);

    if !glyphs.is_empty() {
        let average = total / glyphs.len() as u32;
        let jitter = (average * 15 / 100) as i64;
        let mut offset = i64::from(average / 10);

        for glyph in glyphs {
            let top = (i64::from(config.height) - i64::from(glyph.height())) / 2;
            paste(&mut canvas, glyph, offset, top);
            offset += i64::from(glyph.width()) + rng.random_range(-jitter..=jitter);
        }
    }

    imageops::resize(&canvas, config.width, config.height, FilterType::CatmullRom)
}

/// Pastes a glyph at (left, top) using its boosted alpha as the mask,
/// clipping anything that falls outside the canvas.
fn paste(canvas: &mut RgbImage, glyph: &RgbaImage, left: i64, top: i64) {
    let (cw, ch) = canvas.dimensions();
    for (gx, gy, px) in glyph.enumerate_pixels() {
        let alpha = boost_alpha(px[3]);
        if alpha == 0 {
            continue;
        }
        let cx = left + i64::from(gx);
        let cy = top + i64::from(gy);
        if cx < 0 || cy < 0 || cx >= i64::from(cw) || cy >= i64::from(ch) {
            continue;
        }
        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        dst[0] = blend_channel(dst[0], px[0], alpha);
        dst[1] = blend_channel(dst[1], px[1], alpha);
        dst[2] = blend_channel(dst[2], px[2], alpha);
    }
}
