//! Error types and result aliases.
//!
//! Defines the `CaptchaError` enumeration and common `Result` type.

use thiserror::Error;

/// Rendering-engine errors.
///
/// Every variant is fatal for the call that produced it; the engine never
/// hands back a partially composed image.
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// Invalid rendering configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Font resource missing or unparsable.
    #[error("font load error: {0}")]
    FontLoad(String),

    /// Unexpected failure while rasterizing or transforming a glyph.
    #[error("render error: {0}")]
    Render(String),
}

/// Result type alias for `CaptchaError`.
pub type Result<T> = std::result::Result<T, CaptchaError>;
