//! Font loading and caching.
//!
//! Loads every configured font at every configured size exactly once and
//! shares the parsed handles across all subsequent rasterization calls.

use crate::config::{CaptchaError, FontSource, RenderConfig, Result};
use ab_glyph::{FontArc, PxScale};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Reads a font file from disk. Swappable so tests can count loads.
pub type FontReader = fn(&Path) -> std::io::Result<Vec<u8>>;

/// An opened font at one specific point size.
#[derive(Debug, Clone)]
pub struct FontHandle {
    pub font: FontArc,
    pub scale: PxScale,
}

/// Thread-safe registry of font/size combinations.
///
/// Initialization is lazy: the first `handles` call parses the full
/// font x size cross-product and retains it for the cache's lifetime.
/// Concurrent first calls serialize on `init`, so each backing resource
/// is read at most once; later reads hit the `OnceLock` without locking.
pub struct FontCache {
    sources: Vec<FontSource>,
    sizes: Vec<f32>,
    reader: FontReader,
    handles: OnceLock<Vec<FontHandle>>,
    init: Mutex<()>,
}

impl FontCache {
    /// Creates a cache for the configured fonts and sizes.
    #[must_use]
    pub fn new(config: &RenderConfig) -> Self {
        Self::with_reader(config, |path| std::fs::read(path))
    }

    /// Creates a cache with a custom file reader.
    ///
    /// Intended for tests that stub out or count resource reads.
    #[must_use]
    pub fn with_reader(config: &RenderConfig, reader: FontReader) -> Self {
        Self {
            sources: config.fonts.clone(),
            sizes: config.font_sizes.clone(),
            reader,
            handles: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Returns the loaded handles, initializing the cache on first access.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::FontLoad` if a font resource is missing or
    /// cannot be parsed. A failed initialization leaves the cache cold, so
    /// a later call retries the load.
    pub fn handles(&self) -> Result<&[FontHandle]> {
        if let Some(handles) = self.handles.get() {
            return Ok(handles);
        }

        let _guard = self
            .init
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(handles) = self.handles.get() {
            return Ok(handles);
        }

        let loaded = self.load_all()?;
        Ok(self.handles.get_or_init(|| loaded))
    }

    fn load_all(&self) -> Result<Vec<FontHandle>> {
        let mut handles = Vec::with_capacity(self.sources.len() * self.sizes.len());
        for source in &self.sources {
            let font = match source {
                FontSource::Bytes(bytes) => FontArc::try_from_slice(*bytes)
                    .map_err(|e| CaptchaError::FontLoad(format!("embedded font: {e}")))?,
                FontSource::Path(path) => {
                    let bytes = (self.reader)(path).map_err(|e| {
                        CaptchaError::FontLoad(format!("{}: {e}", path.display()))
                    })?;
                    FontArc::try_from_vec(bytes).map_err(|e| {
                        CaptchaError::FontLoad(format!("{}: {e}", path.display()))
                    })?
                }
            };
            for size in &self.sizes {
                handles.push(FontHandle {
                    font: font.clone(),
                    scale: PxScale::from(*size),
                });
            }
        }
        Ok(handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_loads_full_cross_product() {
        let config = RenderConfig::default();
        let cache = FontCache::new(&config);
        let handles = cache.handles().unwrap();
        assert_eq!(
            handles.len(),
            config.fonts.len() * config.font_sizes.len()
        );
    }

    #[test]
    fn test_missing_font_file_is_font_load_error() {
        let config = RenderConfig {
            fonts: vec![FontSource::Path(PathBuf::from("/nonexistent/font.ttf"))],
            ..RenderConfig::default()
        };
        let cache = FontCache::new(&config);
        assert!(matches!(
            cache.handles(),
            Err(CaptchaError::FontLoad(_))
        ));
    }

    #[test]
    fn test_unparsable_font_is_font_load_error() {
        let config = RenderConfig {
            fonts: vec![FontSource::Bytes(b"not a font")],
            ..RenderConfig::default()
        };
        let cache = FontCache::new(&config);
        assert!(matches!(
            cache.handles(),
            Err(CaptchaError::FontLoad(_))
        ));
    }

    #[test]
    fn test_failed_init_leaves_cache_retryable() {
        let config = RenderConfig {
            fonts: vec![FontSource::Path(PathBuf::from("/nonexistent/font.ttf"))],
            ..RenderConfig::default()
        };
        let cache = FontCache::new(&config);
        assert!(cache.handles().is_err());
        assert!(cache.handles().is_err());
    }
}
