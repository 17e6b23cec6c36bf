//! Per-character rasterization.
//!
//! Renders one character into a tightly cropped RGBA bitmap using a
//! randomly chosen font/size handle.

use crate::config::{CaptchaError, RenderConfig, Result};
use crate::render::font::FontCache;
use ab_glyph::{Font, point};
use image::{Rgba, RgbaImage, imageops};
use rand::Rng;

/// Renders `ch` into a transparent RGBA buffer sized to its ink bounding
/// box plus random padding (dx in 0..=4, dy in 0..=6), then crops the
/// result back to the drawn ink.
///
/// The font/size pair is chosen independently per character, so mixed
/// sizes within one challenge string are expected.
///
/// # Errors
///
/// Returns `CaptchaError::Render` if the character has no drawable outline
/// in the chosen font, and `CaptchaError::FontLoad` if the font cache
/// fails to initialize.
pub fn rasterize(
    ch: char,
    config: &RenderConfig,
    fonts: &FontCache,
    rng: &mut impl Rng,
) -> Result<RgbaImage> {
    let handles = fonts.handles()?;
    let handle = &handles[rng.random_range(0..handles.len())];

    let glyph = handle
        .font
        .glyph_id(ch)
        .with_scale_and_position(handle.scale, point(0.0, 0.0));
    let outlined = handle
        .font
        .outline_glyph(glyph)
        .ok_or_else(|| CaptchaError::Render(format!("no outline for character {ch:?}")))?;

    let bounds = outlined.px_bounds();
    let ink_w = bounds.width().ceil().max(1.0) as u32;
    let ink_h = bounds.height().ceil().max(1.0) as u32;

    let dx = rng.random_range(0..=4u32);
    let dy = rng.random_range(0..=6u32);

    let mut buf = RgbaImage::new(ink_w + 2 * dx, ink_h + 2 * dy);
    let fg = config.foreground;
    outlined.draw(|x, y, coverage| {
        let px = x + dx;
        let py = y + dy;
        if px < buf.width() && py < buf.height() {
            let alpha = (coverage.clamp(0.0, 1.0) * f32::from(fg[3])).round() as u8;
            buf.put_pixel(px, py, Rgba([fg[0], fg[1], fg[2], alpha]));
        }
    });

    crop_to_ink(&buf)
        .ok_or_else(|| CaptchaError::Render(format!("character {ch:?} rendered no ink")))
}

/// Bounding box of non-transparent pixels as (x, y, width, height).
pub(crate) fn ink_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for (x, y, px) in img.enumerate_pixels() {
        if px[3] > 0 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x > max_x {
        return None;
    }
    Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Crops an RGBA buffer to its non-transparent bounding box.
pub(crate) fn crop_to_ink(img: &RgbaImage) -> Option<RgbaImage> {
    let (x, y, w, h) = ink_bounds(img)?;
    Some(imageops::crop_imm(img, x, y, w, h).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_rasterize_alphanumerics_nonzero() {
        let config = RenderConfig::default();
        let fonts = FontCache::new(&config);
        let mut rng = StdRng::seed_from_u64(1);
        for ch in "abcXYZ0189".chars() {
            let glyph = rasterize(ch, &config, &fonts, &mut rng).unwrap();
            assert!(glyph.width() > 0, "zero width for {ch:?}");
            assert!(glyph.height() > 0, "zero height for {ch:?}");
        }
    }

    #[test]
    fn test_rasterize_crop_is_tight() {
        let config = RenderConfig::default();
        let fonts = FontCache::new(&config);
        let mut rng = StdRng::seed_from_u64(2);
        let glyph = rasterize('H', &config, &fonts, &mut rng).unwrap();

        let (w, h) = glyph.dimensions();
        let top_ink = (0..w).any(|x| glyph.get_pixel(x, 0)[3] > 0);
        let bottom_ink = (0..w).any(|x| glyph.get_pixel(x, h - 1)[3] > 0);
        let left_ink = (0..h).any(|y| glyph.get_pixel(0, y)[3] > 0);
        let right_ink = (0..h).any(|y| glyph.get_pixel(w - 1, y)[3] > 0);
        assert!(top_ink && bottom_ink && left_ink && right_ink);
    }

    #[test]
    fn test_ink_bounds_of_blank_buffer() {
        let blank = RgbaImage::new(8, 8);
        assert!(ink_bounds(&blank).is_none());
    }

    #[test]
    fn test_ink_bounds_single_pixel() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(3, 7, Rgba([0, 0, 0, 128]));
        assert_eq!(ink_bounds(&img), Some((3, 7, 1, 1)));
    }
}
