use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Encoded format produced by an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Tunables for the raster editor and the merge planner.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Longest horizontal extent of the editing surface, in pixels
    pub max_surface_width: u32,
    /// Longest vertical extent of the editing surface, in pixels
    pub max_surface_height: u32,
    /// Edge length of one mosaic cell
    pub mosaic_block_size: u32,
    pub default_line_width: f32,
    pub default_color: Color32,
    pub export_quality: f32,
    pub export_format: ExportFormat,
    /// Horizontal gap reserved between two merged image blocks, in percent
    pub merge_gap_percent: u8,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_surface_width: 800,
            max_surface_height: 600,
            mosaic_block_size: 10,
            default_line_width: 3.0,
            default_color: Color32::RED,
            export_quality: 0.9,
            export_format: ExportFormat::Jpeg,
            merge_gap_percent: 2,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_surface_width == 0 || self.max_surface_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_surface_width/max_surface_height",
                reason: "surface caps must be positive".to_owned(),
            });
        }
        if self.mosaic_block_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mosaic_block_size",
                reason: "must be at least 1 pixel".to_owned(),
            });
        }
        if !(self.default_line_width.is_finite() && self.default_line_width > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "default_line_width",
                reason: format!("{} is not a positive width", self.default_line_width),
            });
        }
        if self.merge_gap_percent > crate::merge::MAX_GAP_PERCENT {
            return Err(ConfigError::InvalidValue {
                field: "merge_gap_percent",
                reason: format!("{}% leaves less than 1% per block", self.merge_gap_percent),
            });
        }
        Ok(())
    }
}
