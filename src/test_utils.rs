//! Test utilities and shared configuration.
//!
//! Common helpers for unit and integration tests.

#[cfg(any(test, feature = "testing"))]
use crate::config::RenderConfig;

/// A small configuration matching the login-flow caller: 100x38 output
/// with moderate font sizes.
#[cfg(any(test, feature = "testing"))]
#[must_use]
pub fn test_config() -> RenderConfig {
    RenderConfig {
        width: 100,
        height: 38,
        font_sizes: vec![28.0, 30.0, 32.0],
        ..RenderConfig::default()
    }
}
