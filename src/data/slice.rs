use serde::Serialize;

use super::model::{Material, SpectrumTable};
use crate::error::LookupError;

// ---------------------------------------------------------------------------
// SliceAxis – which parameter varies along the rows of a slice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SliceAxis {
    /// Rows are diameters, the medium index is fixed.
    Diameter,
    /// Rows are medium refractive indices, the diameter is fixed.
    MediumIndex,
}

impl SliceAxis {
    /// Index column header used in exported CSV files.
    pub fn index_label(self) -> &'static str {
        match self {
            SliceAxis::Diameter => "Diameter (nm)",
            SliceAxis::MediumIndex => "Medium Refractive Index",
        }
    }

    /// Inverse of [`SliceAxis::index_label`].
    pub fn from_index_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Diameter (nm)" => Some(SliceAxis::Diameter),
            "Medium Refractive Index" => Some(SliceAxis::MediumIndex),
            _ => None,
        }
    }

    /// Render a row value the way it appears in labels, CSV cells and filenames.
    pub fn format_value(self, value: f64) -> String {
        match self {
            SliceAxis::Diameter => format_diameter(value),
            SliceAxis::MediumIndex => format_medium_index(value),
        }
    }
}

/// Integral diameters print without a fractional part: `150`.
pub fn format_diameter(d: f64) -> String {
    if d.fract() == 0.0 && d.abs() < 1e15 {
        format!("{}", d as i64)
    } else {
        format!("{d}")
    }
}

/// Indices always keep at least one decimal: `1.0`, `2.4`.
pub fn format_medium_index(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}

// ---------------------------------------------------------------------------
// Grid – row values × wavelengths matrix
// ---------------------------------------------------------------------------

/// Plain extinction matrix: `values[i][j]` is row `row_values[i]` at `wavelengths[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub row_values: Vec<f64>,
    pub wavelengths: Vec<f64>,
    pub wavelength_labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl Grid {
    pub fn n_rows(&self) -> usize {
        self.row_values.len()
    }

    /// Smallest and largest finite value in the matrix.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// ---------------------------------------------------------------------------
// Slice – a Grid taken out of the table for one material
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub material: Material,
    /// Parameter that varies along the rows.
    pub axis: SliceAxis,
    /// Value of the other parameter, held constant.
    pub fixed: f64,
    pub grid: Grid,
}

impl Slice {
    /// Rows = `diameters` (in the given order), medium index fixed.
    pub fn diameter_sweep(
        table: &SpectrumTable,
        material: Material,
        medium_index: f64,
        diameters: &[f64],
    ) -> Result<Self, LookupError> {
        Self::extract(table, material, SliceAxis::Diameter, medium_index, diameters)
    }

    /// Rows = `indices` (in the given order), diameter fixed.
    pub fn index_sweep(
        table: &SpectrumTable,
        material: Material,
        diameter: f64,
        indices: &[f64],
    ) -> Result<Self, LookupError> {
        Self::extract(table, material, SliceAxis::MediumIndex, diameter, indices)
    }

    /// Every row for which a value was requested must exist; otherwise the
    /// whole slice fails.
    fn extract(
        table: &SpectrumTable,
        material: Material,
        axis: SliceAxis,
        fixed: f64,
        row_values: &[f64],
    ) -> Result<Self, LookupError> {
        let values = row_values
            .iter()
            .map(|&v| {
                let (diameter, medium_index) = match axis {
                    SliceAxis::Diameter => (v, fixed),
                    SliceAxis::MediumIndex => (fixed, v),
                };
                table
                    .find(material, diameter, medium_index)
                    .map(|row| row.extinction.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;

        // an empty request still fails for a material with no rows
        if row_values.is_empty() {
            table.rows_for(material)?;
        }

        Ok(Slice {
            material,
            axis,
            fixed,
            grid: Grid {
                row_values: row_values.to_vec(),
                wavelengths: table.wavelengths().to_vec(),
                wavelength_labels: table.wavelength_labels().to_vec(),
                values,
            },
        })
    }
}
