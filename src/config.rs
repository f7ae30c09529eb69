//! Preview pipeline configuration.
//!
//! # Example
//!
//! ```toml
//! base_debounce_ms = 300      # Fallback edit debounce delay
//! render_coalesce_ms = 40     # Render queue coalescing window
//! channel_buffer = 32         # Actor channel capacity
//! main_file = "main.typ"      # Designated main-file name for imports
//! source_extension = "typ"    # Recognized source extension
//! pixel_scale = 2.0           # Fixed render pixel scale fallback
//! ```
//!
//! All fields are optional; unknown fields are warned about, not rejected.

use anyhow::Result;
use serde::Deserialize;

use crate::log;

/// Pipeline tuning knobs, loaded from TOML or built from [`Default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Fallback debounce delay when no adaptive rule matches.
    pub base_debounce_ms: u64,

    /// Coalescing window for the render queue after an idle period.
    pub render_coalesce_ms: u64,

    /// Capacity of the actor channels.
    pub channel_buffer: usize,

    /// Designated main-file name used by import auto-detection.
    pub main_file: String,

    /// Recognized source extension (without dot) for import auto-detection.
    pub source_extension: String,

    /// Render pixel scale used when the surface reports none.
    pub pixel_scale: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            base_debounce_ms: 300,
            render_coalesce_ms: 40,
            channel_buffer: 32,
            main_file: "main.typ".into(),
            source_extension: "typ".into(),
            pixel_scale: 2.0,
        }
    }
}

impl PreviewConfig {
    /// Parse TOML content, warning about unknown fields.
    pub fn from_toml(content: &str) -> Result<Self> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            log!("config"; "ignoring unknown fields: {}", ignored.join(", "));
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }
}
