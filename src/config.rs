//! JSON configuration for the viewer and the headless exporter.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::data::model::Material;

/// Top-level viewer configuration. Every field has a default, so `{}` is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Spectrum table loaded at startup.
    pub data_path: Option<PathBuf>,
    /// Diameters (nm) drawn as lines when the medium index is fixed.
    pub standard_diameters: Vec<f64>,
    /// Medium indices drawn as lines when the diameter is fixed.
    pub standard_indices: Vec<f64>,
    pub initial_selection: SelectionConfig,
    pub diameter_slider: SliderConfig,
    pub index_slider: SliderConfig,
    pub slice_extent: SliceExtent,
    /// Default directory for exported CSV files.
    pub export_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            standard_diameters: vec![90.0, 110.0, 140.0, 170.0, 200.0],
            standard_indices: vec![1.0, 1.4, 2.0, 2.4, 3.0],
            initial_selection: SelectionConfig::default(),
            diameter_slider: SliderConfig {
                min: 10.0,
                max: 200.0,
                step: 10.0,
            },
            index_slider: SliderConfig {
                min: 1.0,
                max: 3.0,
                step: 0.2,
            },
            slice_extent: SliceExtent::Standard,
            export_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub material: Material,
    pub diameter: f64,
    pub medium_index: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            material: Material::Au,
            diameter: 150.0,
            medium_index: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Which rows go into the heatmaps and CSV exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceExtent {
    /// Only the standard diameters / indices.
    #[default]
    Standard,
    /// Every row the table holds at the fixed parameter.
    Full,
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.standard_diameters.is_empty() {
            bail!("standard_diameters must not be empty");
        }
        if self.standard_indices.is_empty() {
            bail!("standard_indices must not be empty");
        }
        let sliders = [
            ("diameter_slider", &self.diameter_slider),
            ("index_slider", &self.index_slider),
        ];
        for (name, s) in sliders {
            if !(s.min < s.max) {
                bail!("{name}: min ({}) must be below max ({})", s.min, s.max);
            }
            if !(s.step > 0.0) {
                bail!("{name}: step must be positive, got {}", s.step);
            }
        }
        Ok(())
    }
}

/// Read and validate a configuration file.
pub fn load_config(path: &Path) -> Result<ViewerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: ViewerConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Config from `path` if given, defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(ViewerConfig::default()),
    }
}
