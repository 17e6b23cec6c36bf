//! Configuration and error types.
//!
//! Defines the `RenderConfig` parameters and the `CaptchaError` taxonomy.

pub mod error;
pub mod settings;

pub use error::{CaptchaError, Result};
pub use settings::{DEFAULT_FONT, FontSource, RenderConfig, random_color};
