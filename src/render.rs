//! The rendering pipeline.
//!
//! One module per stage: font cache, glyph rasterization, geometric
//! distortion, canvas composition, noise injection, and finishing.

pub mod compose;
pub mod distort;
pub mod engine;
pub mod finish;
pub mod font;
pub mod glyph;
pub mod noise;

pub use engine::CaptchaEngine;
pub use font::{FontCache, FontHandle};
pub use noise::{ArcParams, DotParams, NoisePlan};
