//! `textcha` - obfuscated challenge-image rendering engine.
//!
//! Turns a short alphanumeric string into a distorted raster image that a
//! human can read but naive text recognition struggles with. The caller
//! owns challenge text generation and answer correlation; this crate only
//! renders.

pub mod config;
pub mod render;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use config::{CaptchaError, FontSource, RenderConfig, Result, random_color};
pub use render::engine::CaptchaEngine;
pub use render::font::FontCache;
pub use render::noise::NoisePlan;
