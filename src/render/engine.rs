//! Challenge-image generation engine.
//!
//! Drives the rasterize → distort → compose → noise → finish pipeline for
//! one challenge string. The engine holds only read-only state after
//! construction, so one instance serves many calls from many threads.

use crate::config::{CaptchaError, RenderConfig, Result};
use crate::render::font::FontCache;
use crate::render::{compose, distort, finish, glyph, noise};
use image::{ImageFormat, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tracing::debug;

/// Renders short obfuscated text images.
///
/// Randomness is threaded explicitly as `&mut impl Rng`; with a seeded RNG
/// the output bytes are fully deterministic.
pub struct CaptchaEngine {
    config: RenderConfig,
    fonts: FontCache,
}

impl CaptchaEngine {
    /// Creates an engine, validating the configuration eagerly.
    ///
    /// Fonts are loaded lazily on the first `generate` call.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` for an invalid configuration.
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let fonts = FontCache::new(&config);
        Ok(Self { config, fonts })
    }

    /// Creates an engine around an existing font cache.
    ///
    /// Useful when the cache needs a custom reader, e.g. in tests.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` for an invalid configuration.
    pub fn with_fonts(config: RenderConfig, fonts: FontCache) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, fonts })
    }

    /// The configuration this engine renders with.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders `text` and encodes it as PNG.
    ///
    /// # Errors
    ///
    /// Propagates `FontLoad` from a cold cache and `Render` for empty text
    /// or characters without an outline in the chosen font.
    pub fn generate(&self, text: &str, rng: &mut impl Rng) -> Result<Vec<u8>> {
        self.generate_with_format(text, ImageFormat::Png, rng)
    }

    /// Renders `text` and encodes it in the requested raster format.
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate), plus `Render` if the format
    /// cannot be encoded.
    pub fn generate_with_format(
        &self,
        text: &str,
        format: ImageFormat,
        rng: &mut impl Rng,
    ) -> Result<Vec<u8>> {
        let canvas = self.render(text, rng)?;
        finish::finish(&canvas, format)
    }

    /// Renders `text` with an RNG seeded from `seed`; identical inputs
    /// produce byte-identical PNG output.
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    pub fn generate_seeded(&self, text: &str, seed: u64) -> Result<Vec<u8>> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(text, &mut rng)
    }

    /// Renders `text` and writes the encoded image to `writer`.
    ///
    /// # Errors
    ///
    /// Same as [`generate_with_format`](Self::generate_with_format), plus
    /// `Render` if the writer fails.
    pub fn write_to<W: Write>(
        &self,
        text: &str,
        writer: &mut W,
        format: ImageFormat,
        rng: &mut impl Rng,
    ) -> Result<()> {
        let bytes = self.generate_with_format(text, format, rng)?;
        writer
            .write_all(&bytes)
            .map_err(|e| CaptchaError::Render(format!("image write failed: {e}")))
    }

    fn render(&self, text: &str, rng: &mut impl Rng) -> Result<RgbImage> {
        if text.is_empty() {
            return Err(CaptchaError::Render("empty challenge text".to_string()));
        }

        let mut glyphs = Vec::with_capacity(text.chars().count());
        for ch in text.chars() {
            let raster = glyph::rasterize(ch, &self.config, &self.fonts, rng)?;
            glyphs.push(distort::distort(&raster, &self.config, rng)?);
        }

        let mut canvas = compose::compose(&glyphs, &self.config, rng);
        let plan = noise::plan(&self.config, rng);
        noise::inject(&mut canvas, &plan, &self.config);

        debug!(
            chars = glyphs.len(),
            dots = plan.dots.len(),
            arcs = plan.arcs.len(),
            width = canvas.width(),
            height = canvas.height(),
            "rendered challenge canvas"
        );
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_config;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            CaptchaEngine::new(config),
            Err(CaptchaError::Config(_))
        ));
    }

    #[test]
    fn test_empty_text_is_render_error() {
        let engine = CaptchaEngine::new(test_config()).unwrap();
        assert!(matches!(
            engine.generate_seeded("", 1),
            Err(CaptchaError::Render(_))
        ));
    }

    #[test]
    fn test_generate_produces_png() {
        let engine = CaptchaEngine::new(test_config()).unwrap();
        let bytes = engine.generate_seeded("ab12", 42).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_write_to_matches_generate() {
        let engine = CaptchaEngine::new(test_config()).unwrap();
        let bytes = engine.generate_seeded("xy", 7).unwrap();

        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);
        engine
            .write_to("xy", &mut out, ImageFormat::Png, &mut rng)
            .unwrap();
        assert_eq!(out, bytes);
    }
}
