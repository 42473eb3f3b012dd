use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use eframe::egui::TextureHandle;

use mie_viewer::config::ViewerConfig;
use mie_viewer::data::loader;
use mie_viewer::data::model::{Material, SpectrumTable, quantize_param};
use mie_viewer::view::{Selection, SpectrumView, ViewBuilder};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Heatmap textures for the current view, uploaded lazily by the plot code.
pub struct HeatmapTextures {
    pub diameter: TextureHandle,
    pub dielectric: TextureHandle,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Builder over the loaded table (None until a file is loaded).
    pub builder: Option<ViewBuilder>,

    /// File the table came from.
    pub source: Option<PathBuf>,

    /// Current control values.
    pub selection: Selection,

    /// Date stamped into export filenames.
    pub export_date: NaiveDate,

    /// View for the current selection; None when the last rebuild failed.
    pub view: Option<SpectrumView>,

    /// Invalidated whenever `view` changes.
    pub textures: Option<HeatmapTextures>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: ViewerConfig, today: NaiveDate) -> Self {
        let init = &config.initial_selection;
        let selection = Selection {
            material: init.material,
            diameter: init.diameter,
            medium_index: init.medium_index,
        };
        Self {
            config,
            builder: None,
            source: None,
            selection,
            export_date: today,
            view: None,
            textures: None,
            status_message: None,
        }
    }

    /// Load a table from disk, reporting failures in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(table) => self.set_table(table, path.to_path_buf()),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table and rebuild the view.
    pub fn set_table(&mut self, table: SpectrumTable, source: PathBuf) {
        self.builder = Some(ViewBuilder::new(Arc::new(table), &self.config));
        self.source = Some(source);
        self.rebuild();
    }

    pub fn set_material(&mut self, material: Material) {
        if self.selection.material != material {
            self.selection.material = material;
            self.rebuild();
        }
    }

    pub fn set_diameter(&mut self, diameter: f64) {
        self.selection.diameter = quantize_param(diameter);
        self.rebuild();
    }

    pub fn set_medium_index(&mut self, medium_index: f64) {
        self.selection.medium_index = quantize_param(medium_index);
        self.rebuild();
    }

    pub fn set_export_date(&mut self, date: NaiveDate) {
        self.export_date = date;
        self.rebuild();
    }

    /// Recompute the whole view from the current selection.
    pub fn rebuild(&mut self) {
        self.textures = None;
        let Some(builder) = &self.builder else {
            self.view = None;
            return;
        };
        match builder.build(&self.selection, self.export_date) {
            Ok(view) => {
                self.view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("No view for {:?}: {e}", self.selection);
                self.view = None;
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Values the table actually holds for the selected material, for the
    /// side panel hint.
    pub fn available_values(&self) -> Option<(Vec<f64>, Vec<f64>)> {
        let table = self.builder.as_ref()?.table();
        let material = self.selection.material;
        Some((
            table.diameters(material).ok()?,
            table.medium_indices(material).ok()?,
        ))
    }
}
