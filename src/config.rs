use crate::{EdgeStyle, GridSettings, Tool};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Designer tunables. Every field falls back to its default when missing
/// from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// A connection into an occupied input evicts the existing edge instead
    /// of being rejected
    pub replace_on_connect: bool,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom change per wheel unit
    pub zoom_sensitivity: f32,
    pub grid: GridSettings,
    /// Screen-space radius around a port that counts as a hit
    pub port_hit_radius: f32,
    /// Screen-space distance from an edge path that counts as a hit
    pub edge_hit_tolerance: f32,
    pub edge_style: EdgeStyle,
    pub default_tool: Tool,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            replace_on_connect: true,
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_sensitivity: 0.001,
            grid: GridSettings::default(),
            port_hit_radius: 8.0,
            edge_hit_tolerance: 6.0,
            edge_style: EdgeStyle::default(),
            default_tool: Tool::Select,
        }
    }
}

impl DesignerConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Self = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config from: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in: {}", path.display()))?;
        Ok(config)
    }

    /// Save config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write config to: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom > 0.0 && self.min_zoom.is_finite()) {
            bail!("min_zoom must be positive, got {}", self.min_zoom);
        }
        if !(self.max_zoom >= self.min_zoom && self.max_zoom.is_finite()) {
            bail!(
                "max_zoom ({}) must be finite and not below min_zoom ({})",
                self.max_zoom,
                self.min_zoom
            );
        }
        if !(self.zoom_sensitivity > 0.0) {
            bail!("zoom_sensitivity must be positive");
        }
        if !(self.grid.size > 0.0) {
            bail!("grid size must be positive, got {}", self.grid.size);
        }
        if self.port_hit_radius < 0.0 || self.edge_hit_tolerance < 0.0 {
            bail!("hit radii must not be negative");
        }

        let style = &self.edge_style;
        if style.bump_length < 0.0 || style.curve_factor < 0.0 || style.min_control_offset < 0.0 {
            bail!("edge style values must not be negative");
        }
        if style.max_control_offset < style.min_control_offset {
            bail!(
                "max_control_offset ({}) is below min_control_offset ({})",
                style.max_control_offset,
                style.min_control_offset
            );
        }

        Ok(())
    }

    /// Zoom range as an inclusive pair
    pub fn zoom_range(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = DesignerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.replace_on_connect);
        assert_eq!(config.zoom_range(), (0.1, 5.0));
        assert_eq!(config.grid.size, 50.0);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("designer.json");

        let mut config = DesignerConfig::default();
        config.replace_on_connect = false;
        config.grid.snap = true;
        config.save(&path).unwrap();

        let loaded = DesignerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("designer.json");
        fs::write(&path, r#"{ "max_zoom": 3.0, "grid": { "snap": true } }"#).unwrap();

        let loaded = DesignerConfig::load(&path).unwrap();
        assert_eq!(loaded.max_zoom, 3.0);
        assert!(loaded.grid.snap);
        assert_eq!(loaded.grid.size, 50.0);
        assert_eq!(loaded.min_zoom, 0.1);
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("designer.json");
        fs::write(&path, r#"{ "min_zoom": 2.0, "max_zoom": 1.0 }"#).unwrap();

        let err = DesignerConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("max_zoom"));
    }

    #[test]
    fn test_invalid_edge_style_rejected() {
        let mut config = DesignerConfig::default();
        config.edge_style.max_control_offset = 10.0;
        assert!(config.validate().is_err());
    }
}
