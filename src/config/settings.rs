//! Rendering configuration.
//!
//! Defines the `RenderConfig` struct, validation, and environment loading.

use crate::config::error::{CaptchaError, Result};
use image::{Rgb, Rgba};
use rand::Rng;
use std::env;
use std::path::PathBuf;

/// Default font shipped with the crate.
pub const DEFAULT_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Default candidate point sizes.
pub const DEFAULT_FONT_SIZES: [f32; 3] = [42.0, 50.0, 56.0];

fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_u32_or(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn get_env_f32_or(key: &str, default: f32) -> f32 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// A font resource: either bytes embedded in the binary or a file on disk.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// Embedded TTF/OTF data.
    Bytes(&'static [u8]),
    /// Path to a TTF/OTF file, read once at cache initialization.
    Path(PathBuf),
}

/// Immutable parameters for one engine instance.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output image width in pixels.
    pub width: u32,
    /// Output image height in pixels.
    pub height: u32,
    /// Candidate font resources; one is picked at random per character.
    pub fonts: Vec<FontSource>,
    /// Candidate font point sizes; one is picked at random per character.
    pub font_sizes: Vec<f32>,
    /// Stroke color for glyphs and noise, with a fixed alpha.
    pub foreground: Rgba<u8>,
    /// Canvas fill color.
    pub background: Rgb<u8>,
    /// Stroke width of noise dots, in pixels.
    pub dot_size: u32,
    /// Number of noise dots drawn per image.
    pub dot_number: u32,
    /// Number of crossing noise arcs drawn per image.
    pub curve_number: u32,
    /// Per-glyph rotation is drawn uniformly from this bound, in degrees.
    pub max_rotate_angle: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 60,
            fonts: vec![FontSource::Bytes(DEFAULT_FONT)],
            font_sizes: DEFAULT_FONT_SIZES.to_vec(),
            foreground: Rgba([64, 96, 160, 235]),
            background: Rgb([238, 242, 248]),
            dot_size: 2,
            dot_number: 30,
            curve_number: 1,
            max_rotate_angle: 30.0,
        }
    }
}

impl RenderConfig {
    /// Loads a configuration from `CAPTCHA_*` environment variables,
    /// falling back to the defaults above.
    ///
    /// `CAPTCHA_FONTS` and `CAPTCHA_FONT_SIZES` are comma-separated lists;
    /// an empty font list keeps the embedded default font.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let fonts: Vec<FontSource> = get_env_or("CAPTCHA_FONTS", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| FontSource::Path(PathBuf::from(s)))
            .collect();
        let fonts = if fonts.is_empty() {
            defaults.fonts
        } else {
            fonts
        };

        let font_sizes: Vec<f32> = get_env_or("CAPTCHA_FONT_SIZES", "")
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        let font_sizes = if font_sizes.is_empty() {
            defaults.font_sizes
        } else {
            font_sizes
        };

        Self {
            width: get_env_u32_or("CAPTCHA_WIDTH", defaults.width),
            height: get_env_u32_or("CAPTCHA_HEIGHT", defaults.height),
            fonts,
            font_sizes,
            foreground: defaults.foreground,
            background: defaults.background,
            dot_size: get_env_u32_or("CAPTCHA_DOT_SIZE", defaults.dot_size),
            dot_number: get_env_u32_or("CAPTCHA_DOT_NUMBER", defaults.dot_number),
            curve_number: get_env_u32_or("CAPTCHA_CURVE_NUMBER", defaults.curve_number),
            max_rotate_angle: get_env_f32_or(
                "CAPTCHA_MAX_ROTATE_ANGLE",
                defaults.max_rotate_angle,
            ),
        }
    }

    /// Checks structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Config` if a dimension is zero, the font or
    /// size list is empty, the dot size is zero, or the rotation bound is
    /// negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptchaError::Config(format!(
                "dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fonts.is_empty() {
            return Err(CaptchaError::Config("font list is empty".to_string()));
        }
        if self.font_sizes.is_empty() {
            return Err(CaptchaError::Config("font size list is empty".to_string()));
        }
        if self.font_sizes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(CaptchaError::Config(
                "font sizes must be positive and finite".to_string(),
            ));
        }
        if self.dot_size == 0 {
            return Err(CaptchaError::Config("dot size must be positive".to_string()));
        }
        if !self.max_rotate_angle.is_finite() || self.max_rotate_angle < 0.0 {
            return Err(CaptchaError::Config(
                "max rotate angle must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Picks a random RGB color with each channel in `[start, end]`, optionally
/// attaching a fixed alpha.
#[must_use]
pub fn random_color(start: u8, end: u8, opacity: Option<u8>, rng: &mut impl Rng) -> Rgba<u8> {
    let red = rng.random_range(start..=end);
    let green = rng.random_range(start..=end);
    let blue = rng.random_range(start..=end);
    Rgba([red, green, blue, opacity.unwrap_or(255)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_dimensions() {
        let config = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(config.validate(), Err(CaptchaError::Config(_))));

        let config = RenderConfig {
            height: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(config.validate(), Err(CaptchaError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_empty_lists() {
        let config = RenderConfig {
            fonts: vec![],
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            font_sizes: vec![],
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_sizes_and_angle() {
        let config = RenderConfig {
            font_sizes: vec![0.0],
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            max_rotate_angle: -1.0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_overrides() {
        let _guard = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        unsafe {
            env::set_var("CAPTCHA_WIDTH", "100");
            env::set_var("CAPTCHA_HEIGHT", "38");
            env::set_var("CAPTCHA_FONT_SIZES", "28, 30, 32");
            env::remove_var("CAPTCHA_FONTS");
            env::remove_var("CAPTCHA_DOT_NUMBER");
        }

        let config = RenderConfig::from_env();

        unsafe {
            env::remove_var("CAPTCHA_WIDTH");
            env::remove_var("CAPTCHA_HEIGHT");
            env::remove_var("CAPTCHA_FONT_SIZES");
        }

        assert_eq!(config.width, 100);
        assert_eq!(config.height, 38);
        assert_eq!(config.font_sizes, vec![28.0, 30.0, 32.0]);
        assert_eq!(config.dot_number, 30);
        assert!(matches!(config.fonts[0], FontSource::Bytes(_)));
    }

    #[test]
    fn test_random_color_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let c = random_color(60, 180, Some(220), &mut rng);
            assert!((60..=180).contains(&c[0]));
            assert!((60..=180).contains(&c[1]));
            assert!((60..=180).contains(&c[2]));
            assert_eq!(c[3], 220);
        }
        let c = random_color(10, 20, None, &mut rng);
        assert_eq!(c[3], 255);
    }
}
