//! Editor configuration
//!
//! Every field has a default, so a partial JSON or TOML document is enough
//! to override a single setting.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Scale at which pages are rasterized for preview and export.
pub const DEFAULT_RENDER_SCALE: f64 = 1.5;
pub const DEFAULT_ZOOM_MIN: f64 = 0.1;
pub const DEFAULT_ZOOM_MAX: f64 = 5.0;
pub const DEFAULT_EXPORT_FILE_NAME: &str = "rearranged.pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Rasterization scale relative to PDF points (1.0 = 72 DPI)
    pub render_scale: f64,
    /// Lower bound for the crop preview zoom
    pub zoom_min: f64,
    /// Upper bound for the crop preview zoom
    pub zoom_max: f64,
    /// Zoom level after a document is loaded
    pub zoom_initial: f64,
    /// File name offered when the exported document is saved
    pub export_file_name: String,
    /// PDF version written into the exported header
    pub pdf_version: String,
    /// Compress content streams of the exported document
    pub compress_output: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            render_scale: DEFAULT_RENDER_SCALE,
            zoom_min: DEFAULT_ZOOM_MIN,
            zoom_max: DEFAULT_ZOOM_MAX,
            zoom_initial: 1.0,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            pdf_version: "1.7".to_string(),
            compress_output: true,
        }
    }
}

impl EditorConfig {
    /// Check the invariants the session relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(ConfigError::InvalidScale(self.render_scale));
        }

        if !(self.zoom_min.is_finite() && self.zoom_max.is_finite())
            || self.zoom_min <= 0.0
            || self.zoom_min > self.zoom_max
        {
            return Err(ConfigError::InvalidZoomRange {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }

        if !(self.zoom_min..=self.zoom_max).contains(&self.zoom_initial) {
            return Err(ConfigError::InitialZoomOutOfRange(self.zoom_initial));
        }

        if self.export_file_name.trim().is_empty() {
            return Err(ConfigError::EmptyFileName);
        }

        Ok(())
    }

    /// Parse a JSON document, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_render_scale(mut self, scale: f64) -> Self {
        self.render_scale = scale;
        self
    }

    pub fn with_export_file_name(mut self, name: &str) -> Self {
        self.export_file_name = name.to_string();
        self
    }

    /// Clamp a zoom level into the configured range.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.zoom_initial;
        }
        zoom.clamp(self.zoom_min, self.zoom_max)
    }
}
