//! Spectrum view builder: turns the current selection into everything the
//! window shows. Two line charts, two heatmaps, a page title and two CSV
//! exports, all rebuilt from scratch on every control change.
//!
//! ```text
//!   Selection ──► ViewBuilder::build ──► SpectrumView
//!                      │
//!                      ├─ Slice::diameter_sweep  (index fixed)
//!                      └─ Slice::index_sweep     (diameter fixed)
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::color::{self, ColorScale, Rgb};
use crate::config::{SliceExtent, ViewerConfig};
use crate::data::model::{Material, SpectrumTable};
use crate::data::slice::{Grid, Slice, SliceAxis, format_diameter, format_medium_index};
use crate::error::{BuildError, LookupError};
use crate::export::CsvExport;

pub const WAVELENGTH_AXIS: &str = "Wavelength (nm)";
pub const EXTINCTION_AXIS: &str = "Extinction (a.u.)";
pub const DIAMETER_AXIS: &str = "Diameter (nm)";
pub const MEDIUM_INDEX_AXIS: &str = "Environment Dielectric (n)";

const LINE_WIDTH: f32 = 4.0;

/// The user's current choice of material and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Selection {
    pub material: Material,
    /// Diameter (nm) held fixed in the index sweep.
    pub diameter: f64,
    /// Medium index held fixed in the diameter sweep.
    pub medium_index: f64,
}

// ---------------------------------------------------------------------------
// Chart payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub color: Rgb,
    pub width: f32,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// x = wavelengths, y = row values, z[i][j] = extinction at (y[i], x[j]).
    pub grid: Grid,
    pub scale: ColorScale,
}

impl Heatmap {
    /// Resample onto `height` evenly spaced parameter values, interpolating
    /// linearly between neighbouring rows. Output row 0 is the largest value.
    ///
    /// Rows must be sorted ascending; unsorted rows are sorted first.
    pub fn resample_rows(&self, height: usize) -> Vec<Vec<f64>> {
        let mut order: Vec<usize> = (0..self.grid.n_rows()).collect();
        order.sort_by(|&a, &b| self.grid.row_values[a].total_cmp(&self.grid.row_values[b]));
        let ys: Vec<f64> = order.iter().map(|&i| self.grid.row_values[i]).collect();
        let rows: Vec<&Vec<f64>> = order.iter().map(|&i| &self.grid.values[i]).collect();

        match rows.len() {
            0 => return Vec::new(),
            1 => return vec![rows[0].clone(); height],
            _ => {}
        }

        let (lo, hi) = (ys[0], ys[ys.len() - 1]);
        (0..height)
            .map(|k| {
                let t = if height > 1 {
                    1.0 - k as f64 / (height - 1) as f64
                } else {
                    0.5
                };
                let y = lo + t * (hi - lo);
                // first row at or above y, never the bottom one
                let upper = ys.iter().position(|&v| v >= y).unwrap_or(ys.len() - 1).max(1);
                let (y0, y1) = (ys[upper - 1], ys[upper]);
                let f = if y1 > y0 { (y - y0) / (y1 - y0) } else { 0.0 };
                rows[upper - 1]
                    .iter()
                    .zip(rows[upper].iter())
                    .map(|(a, b)| a + f * (b - a))
                    .collect()
            })
            .collect()
    }
}

/// Everything the window displays for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumView {
    pub selection: Selection,
    pub title: String,
    pub diameter_lines: LineChart,
    pub dielectric_lines: LineChart,
    pub diameter_heatmap: Heatmap,
    pub dielectric_heatmap: Heatmap,
    pub diameter_export: CsvExport,
    pub dielectric_export: CsvExport,
}

// ---------------------------------------------------------------------------
// ViewBuilder
// ---------------------------------------------------------------------------

/// Builds [`SpectrumView`]s over one shared, read-only table.
#[derive(Debug, Clone)]
pub struct ViewBuilder {
    table: Arc<SpectrumTable>,
    standard_diameters: Vec<f64>,
    standard_indices: Vec<f64>,
    extent: SliceExtent,
}

impl ViewBuilder {
    pub fn new(table: Arc<SpectrumTable>, config: &ViewerConfig) -> Self {
        Self {
            table,
            standard_diameters: config.standard_diameters.clone(),
            standard_indices: config.standard_indices.clone(),
            extent: config.slice_extent,
        }
    }

    pub fn table(&self) -> &SpectrumTable {
        &self.table
    }

    pub fn standard_diameters(&self) -> &[f64] {
        &self.standard_diameters
    }

    pub fn standard_indices(&self) -> &[f64] {
        &self.standard_indices
    }

    /// Diameter sweep at the selection's medium index.
    pub fn diameter_slice(&self, sel: &Selection) -> Result<Slice, LookupError> {
        let rows = match self.extent {
            SliceExtent::Standard => self.standard_diameters.clone(),
            SliceExtent::Full => self.table.diameters_at(sel.material, sel.medium_index)?,
        };
        if rows.is_empty() {
            return Err(LookupError::MissingSpectrum {
                material: sel.material,
                diameter: sel.diameter,
                medium_index: sel.medium_index,
            });
        }
        Slice::diameter_sweep(&self.table, sel.material, sel.medium_index, &rows)
    }

    /// Medium index sweep at the selection's diameter.
    pub fn dielectric_slice(&self, sel: &Selection) -> Result<Slice, LookupError> {
        let rows = match self.extent {
            SliceExtent::Standard => self.standard_indices.clone(),
            SliceExtent::Full => self.table.medium_indices_at(sel.material, sel.diameter)?,
        };
        if rows.is_empty() {
            return Err(LookupError::MissingSpectrum {
                material: sel.material,
                diameter: sel.diameter,
                medium_index: sel.medium_index,
            });
        }
        Slice::index_sweep(&self.table, sel.material, sel.diameter, &rows)
    }

    /// Build the full view. `date` stamps the export filenames.
    pub fn build(&self, sel: &Selection, date: NaiveDate) -> Result<SpectrumView, BuildError> {
        log::debug!(
            "Building view for {} d={} n={}",
            sel.material,
            sel.diameter,
            sel.medium_index
        );

        let n_label = format_medium_index(sel.medium_index);
        let d_label = format_diameter(sel.diameter);
        let diameter_title = format!("{}: Vary Diameter. n_env = {n_label}", sel.material);
        let dielectric_title = format!("{}: Vary Dielectric. Diameter = {d_label}nm", sel.material);

        // Line charts always sweep the standard sets.
        let diameter_lines = LineChart {
            title: diameter_title.clone(),
            x_label: WAVELENGTH_AXIS,
            y_label: EXTINCTION_AXIS,
            series: self.sweep_lines(
                sel,
                SliceAxis::Diameter,
                &self.standard_diameters,
                &color::DIAMETER_PALETTE,
            )?,
        };
        let dielectric_lines = LineChart {
            title: dielectric_title.clone(),
            x_label: WAVELENGTH_AXIS,
            y_label: EXTINCTION_AXIS,
            series: self.sweep_lines(
                sel,
                SliceAxis::MediumIndex,
                &self.standard_indices,
                &color::INDEX_PALETTE,
            )?,
        };

        let diameter_slice = self.diameter_slice(sel)?;
        let dielectric_slice = self.dielectric_slice(sel)?;

        let diameter_export =
            CsvExport::from_slice(&diameter_slice, date).map_err(BuildError::Export)?;
        let dielectric_export =
            CsvExport::from_slice(&dielectric_slice, date).map_err(BuildError::Export)?;

        Ok(SpectrumView {
            selection: *sel,
            title: format!("{}: Extinction Mie Spectra", sel.material),
            diameter_lines,
            dielectric_lines,
            diameter_heatmap: Heatmap {
                title: diameter_title,
                x_label: WAVELENGTH_AXIS,
                y_label: DIAMETER_AXIS,
                grid: diameter_slice.grid,
                scale: ColorScale::rd_bu_reversed(),
            },
            dielectric_heatmap: Heatmap {
                title: dielectric_title,
                x_label: WAVELENGTH_AXIS,
                y_label: MEDIUM_INDEX_AXIS,
                grid: dielectric_slice.grid,
                scale: ColorScale::rd_bu_reversed(),
            },
            diameter_export,
            dielectric_export,
        })
    }

    fn sweep_lines(
        &self,
        sel: &Selection,
        axis: SliceAxis,
        values: &[f64],
        palette: &[Rgb],
    ) -> Result<Vec<LineSeries>, LookupError> {
        let slice = match axis {
            SliceAxis::Diameter => {
                Slice::diameter_sweep(&self.table, sel.material, sel.medium_index, values)?
            }
            SliceAxis::MediumIndex => {
                Slice::index_sweep(&self.table, sel.material, sel.diameter, values)?
            }
        };
        let n = slice.grid.n_rows();
        let Grid {
            row_values,
            wavelengths,
            values: extinction,
            ..
        } = slice.grid;

        Ok(row_values
            .into_iter()
            .zip(extinction)
            .enumerate()
            .map(|(i, (v, y))| LineSeries {
                name: match axis {
                    SliceAxis::Diameter => format!("{}nm", format_diameter(v)),
                    SliceAxis::MediumIndex => format!("n_env = {}", format_medium_index(v)),
                },
                color: color::series_color(palette, i, n),
                width: LINE_WIDTH,
                x: wavelengths.clone(),
                y,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;
    use approx::assert_relative_eq;

    /// Au and Ag over the standard sets plus diameter 150; extinction encodes the key.
    fn table_csv() -> String {
        let mut out = String::from("Material,Diameter (nm),Medium Refractive Index,400,500,600\n");
        for (m, base) in [("Au", 0.0), ("Ag", 1000.0)] {
            for d in [90, 110, 140, 150, 170, 200] {
                for n in ["1.0", "1.4", "2.0", "2.4", "3.0"] {
                    let nv: f64 = n.parse().unwrap();
                    let v = base + d as f64 + nv;
                    out.push_str(&format!("{m},{d},{n},{v},{},{}\n", v * 2.0, v * 3.0));
                }
            }
        }
        out
    }

    fn builder(extent: SliceExtent) -> ViewBuilder {
        let table = Arc::new(read_csv(table_csv().as_bytes()).unwrap());
        let config = ViewerConfig {
            slice_extent: extent,
            ..ViewerConfig::default()
        };
        ViewBuilder::new(table, &config)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 9).unwrap()
    }

    fn sel(material: Material, diameter: f64, medium_index: f64) -> Selection {
        Selection {
            material,
            diameter,
            medium_index,
        }
    }

    #[test]
    fn test_titles() {
        let v = builder(SliceExtent::Standard)
            .build(&sel(Material::Au, 150.0, 1.0), date())
            .unwrap();

        assert_eq!(v.title, "Au: Extinction Mie Spectra");
        assert_eq!(v.diameter_lines.title, "Au: Vary Diameter. n_env = 1.0");
        assert_eq!(v.dielectric_lines.title, "Au: Vary Dielectric. Diameter = 150nm");
        assert_eq!(v.diameter_heatmap.y_label, "Diameter (nm)");
        assert_eq!(v.dielectric_heatmap.y_label, "Environment Dielectric (n)");
    }

    #[test]
    fn test_line_series() {
        let v = builder(SliceExtent::Standard)
            .build(&sel(Material::Au, 150.0, 1.4), date())
            .unwrap();

        let names: Vec<&str> = v.diameter_lines.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["90nm", "110nm", "140nm", "170nm", "200nm"]);

        let first = &v.diameter_lines.series[0];
        assert_eq!(first.color, Rgb(255, 153, 154));
        assert_eq!(first.x, vec![400.0, 500.0, 600.0]);
        assert_relative_eq!(first.y[0], 91.4);
        assert_relative_eq!(first.y[2], 91.4 * 3.0);

        let names: Vec<&str> = v.dielectric_lines.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["n_env = 1.0", "n_env = 1.4", "n_env = 2.0", "n_env = 2.4", "n_env = 3.0"]
        );
        assert_eq!(v.dielectric_lines.series[4].color, Rgb(0, 76, 153));
        assert_relative_eq!(v.dielectric_lines.series[4].y[0], 153.0);
    }

    #[test]
    fn test_standard_slices() {
        let v = builder(SliceExtent::Standard)
            .build(&sel(Material::Au, 150.0, 1.0), date())
            .unwrap();
        assert_eq!(
            v.diameter_heatmap.grid.row_values,
            vec![90.0, 110.0, 140.0, 170.0, 200.0]
        );

        let v = builder(SliceExtent::Standard)
            .build(&sel(Material::Ag, 150.0, 1.0), date())
            .unwrap();
        assert_eq!(
            v.dielectric_heatmap.grid.row_values,
            vec![1.0, 1.4, 2.0, 2.4, 3.0]
        );
        assert_relative_eq!(v.dielectric_heatmap.grid.values[1][0], 1151.4);
    }

    #[test]
    fn test_full_extent_includes_every_row() {
        let v = builder(SliceExtent::Full)
            .build(&sel(Material::Au, 150.0, 2.0), date())
            .unwrap();
        assert_eq!(
            v.diameter_heatmap.grid.row_values,
            vec![90.0, 110.0, 140.0, 150.0, 170.0, 200.0]
        );
        assert_eq!(v.dielectric_heatmap.grid.n_rows(), 5);
    }

    #[test]
    fn test_export_filenames() {
        let v = builder(SliceExtent::Standard)
            .build(&sel(Material::Ag, 150.0, 2.4), date())
            .unwrap();
        assert_eq!(
            v.diameter_export.filename,
            "2024_2_9_Material_Ag_Env_Dielectric_2.4.csv"
        );
        assert_eq!(v.dielectric_export.filename, "2024_2_9_Material_Ag_Diameter_150.csv");
        assert!(v.diameter_export.contents.starts_with("Diameter (nm),400,500,600\n90,"));
    }

    #[test]
    fn test_off_grid_selection_fails() {
        let b = builder(SliceExtent::Standard);

        let err = b.build(&sel(Material::Au, 155.0, 1.0), date()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Lookup(LookupError::MissingSpectrum { diameter, .. }) if diameter == 155.0
        ));

        let err = b.build(&sel(Material::Au, 150.0, 1.2), date()).unwrap_err();
        assert!(matches!(err, BuildError::Lookup(LookupError::MissingSpectrum { .. })));

        let err = b.build(&sel(Material::Ge, 150.0, 1.0), date()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Lookup(LookupError::MaterialNotLoaded(Material::Ge))
        ));
    }

    #[test]
    fn test_build_is_repeatable() {
        let b = builder(SliceExtent::Standard);
        let s = sel(Material::Au, 110.0, 3.0);
        assert_eq!(b.build(&s, date()).unwrap(), b.build(&s, date()).unwrap());
    }

    #[test]
    fn test_view_serialises() {
        let v = builder(SliceExtent::Standard)
            .build(&sel(Material::Au, 150.0, 1.0), date())
            .unwrap();
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["selection"]["material"], "Au");
        assert_eq!(json["diameter_lines"]["series"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_resample_rows() {
        let heatmap = Heatmap {
            title: String::new(),
            x_label: WAVELENGTH_AXIS,
            y_label: DIAMETER_AXIS,
            grid: Grid {
                row_values: vec![3.0, 1.0],
                wavelengths: vec![400.0],
                wavelength_labels: vec!["400".into()],
                values: vec![vec![30.0], vec![10.0]],
            },
            scale: ColorScale::rd_bu_reversed(),
        };

        let rows = heatmap.resample_rows(5);
        assert_eq!(rows.len(), 5);
        let col: Vec<f64> = rows.iter().map(|r| r[0]).collect();
        for (got, want) in col.iter().zip([30.0, 25.0, 20.0, 15.0, 10.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }
}
