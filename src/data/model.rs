use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LookupError, TableError};

/// Two parameter values closer than this refer to the same table row.
pub const PARAM_TOLERANCE: f64 = 1e-6;

/// Whether `a` and `b` address the same diameter / medium index.
pub fn same_param(a: f64, b: f64) -> bool {
    (a - b).abs() < PARAM_TOLERANCE
}

/// Snap a slider value onto the tolerance grid so that `1.2000000000000002`
/// is stored, printed and exported as `1.2`.
pub fn quantize_param(v: f64) -> f64 {
    // 1e6 is exact in binary, so the division rounds once
    (v * 1e6).round() / 1e6
}

// ---------------------------------------------------------------------------
// Material – the nine scatterer materials present in the dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Material {
    Au,
    Ag,
    Al,
    Cu,
    GaAs,
    GaN,
    GaP,
    Si,
    Ge,
}

impl Material {
    /// All materials in selector order.
    pub const ALL: [Material; 9] = [
        Material::Au,
        Material::Ag,
        Material::Al,
        Material::Cu,
        Material::GaAs,
        Material::GaN,
        Material::GaP,
        Material::Si,
        Material::Ge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Material::Au => "Au",
            Material::Ag => "Ag",
            Material::Al => "Al",
            Material::Cu => "Cu",
            Material::GaAs => "GaAs",
            Material::GaN => "GaN",
            Material::GaP => "GaP",
            Material::Si => "Si",
            Material::Ge => "Ge",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Material::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| LookupError::UnknownMaterial(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SpectrumRow – one (material, diameter, medium index) extinction spectrum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumRow {
    pub material: Material,
    /// Particle diameter in nm.
    pub diameter: f64,
    /// Refractive index of the surrounding medium.
    pub medium_index: f64,
    /// Extinction per wavelength column, same length as the table's wavelengths.
    pub extinction: Vec<f64>,
}

// ---------------------------------------------------------------------------
// SpectrumTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full precomputed dataset. Built once, then only read.
#[derive(Debug, Clone)]
pub struct SpectrumTable {
    /// Wavelength axis in nm, one entry per extinction column.
    wavelengths: Vec<f64>,
    /// Column headers exactly as they appeared in the source file.
    wavelength_labels: Vec<String>,
    rows: Vec<SpectrumRow>,
    /// Row indices per material, in source order.
    by_material: BTreeMap<Material, Vec<usize>>,
}

impl SpectrumTable {
    /// Validate rows against the wavelength axis and build the material index.
    pub fn from_rows(
        wavelengths: Vec<f64>,
        wavelength_labels: Vec<String>,
        rows: Vec<SpectrumRow>,
    ) -> Result<Self, TableError> {
        if wavelengths.is_empty() {
            return Err(TableError::NoWavelengths);
        }
        if rows.is_empty() {
            return Err(TableError::Empty);
        }
        debug_assert_eq!(wavelengths.len(), wavelength_labels.len());

        let mut by_material: BTreeMap<Material, Vec<usize>> = BTreeMap::new();
        for (i, row) in rows.iter().enumerate() {
            if row.extinction.len() != wavelengths.len() {
                return Err(TableError::RowWidth {
                    row: i,
                    expected: wavelengths.len(),
                    found: row.extinction.len(),
                });
            }
            let seen = by_material.entry(row.material).or_default();
            let duplicate = seen.iter().any(|&j| {
                same_param(rows[j].diameter, row.diameter)
                    && same_param(rows[j].medium_index, row.medium_index)
            });
            if duplicate {
                return Err(TableError::DuplicateKey {
                    row: i,
                    material: row.material,
                    diameter: row.diameter,
                    medium_index: row.medium_index,
                });
            }
            seen.push(i);
        }

        Ok(SpectrumTable {
            wavelengths,
            wavelength_labels,
            rows,
            by_material,
        })
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn wavelength_labels(&self) -> &[String] {
        &self.wavelength_labels
    }

    /// Number of spectra.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty. Always false for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Materials that have at least one row, in enum order.
    pub fn materials(&self) -> Vec<Material> {
        self.by_material.keys().copied().collect()
    }

    /// All rows of one material. Fails when the table holds none.
    pub fn rows_for(
        &self,
        material: Material,
    ) -> Result<impl Iterator<Item = &SpectrumRow> + '_, LookupError> {
        let indices = self
            .by_material
            .get(&material)
            .ok_or(LookupError::MaterialNotLoaded(material))?;
        Ok(indices.iter().map(move |&i| &self.rows[i]))
    }

    /// The row for an exact (material, diameter, medium index) key.
    pub fn find(
        &self,
        material: Material,
        diameter: f64,
        medium_index: f64,
    ) -> Result<&SpectrumRow, LookupError> {
        self.rows_for(material)?
            .find(|r| same_param(r.diameter, diameter) && same_param(r.medium_index, medium_index))
            .ok_or(LookupError::MissingSpectrum {
                material,
                diameter,
                medium_index,
            })
    }

    /// Sorted distinct diameters available for a material.
    pub fn diameters(&self, material: Material) -> Result<Vec<f64>, LookupError> {
        Ok(distinct_sorted(self.rows_for(material)?.map(|r| r.diameter)))
    }

    /// Sorted distinct medium indices available for a material.
    pub fn medium_indices(&self, material: Material) -> Result<Vec<f64>, LookupError> {
        Ok(distinct_sorted(self.rows_for(material)?.map(|r| r.medium_index)))
    }

    /// Diameters that have a row at the given medium index.
    pub fn diameters_at(
        &self,
        material: Material,
        medium_index: f64,
    ) -> Result<Vec<f64>, LookupError> {
        Ok(distinct_sorted(
            self.rows_for(material)?
                .filter(|r| same_param(r.medium_index, medium_index))
                .map(|r| r.diameter),
        ))
    }

    /// Medium indices that have a row at the given diameter.
    pub fn medium_indices_at(
        &self,
        material: Material,
        diameter: f64,
    ) -> Result<Vec<f64>, LookupError> {
        Ok(distinct_sorted(
            self.rows_for(material)?
                .filter(|r| same_param(r.diameter, diameter))
                .map(|r| r.medium_index),
        ))
    }
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| same_param(*a, *b));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(material: Material, diameter: f64, medium_index: f64, ext: f64) -> SpectrumRow {
        SpectrumRow {
            material,
            diameter,
            medium_index,
            extinction: vec![ext, ext * 2.0],
        }
    }

    fn table(rows: Vec<SpectrumRow>) -> Result<SpectrumTable, TableError> {
        SpectrumTable::from_rows(
            vec![400.0, 500.0],
            vec!["400".into(), "500".into()],
            rows,
        )
    }

    #[test]
    fn test_material_parse() {
        assert_eq!("GaAs".parse::<Material>(), Ok(Material::GaAs));
        assert_eq!(" Au ".parse::<Material>(), Ok(Material::Au));
        assert_eq!(
            "Pt".parse::<Material>(),
            Err(LookupError::UnknownMaterial("Pt".into()))
        );
        // names are case sensitive, as in the dataset
        assert!("au".parse::<Material>().is_err());
    }

    #[test]
    fn test_material_display_matches_name() {
        for m in Material::ALL {
            assert_eq!(m.to_string().parse::<Material>(), Ok(m));
        }
    }

    #[test]
    fn test_quantize_param() {
        assert_eq!(quantize_param(1.0 + 0.2), 1.2);
        assert_eq!(quantize_param(150.0), 150.0);
        assert_eq!(quantize_param(0.1 + 0.2), 0.3);
    }

    #[test]
    fn test_find_row() {
        let t = table(vec![
            row(Material::Au, 90.0, 1.0, 0.1),
            row(Material::Au, 110.0, 1.0, 0.2),
            row(Material::Ag, 90.0, 1.0, 0.3),
        ])
        .unwrap();

        assert_eq!(t.find(Material::Au, 110.0, 1.0).unwrap().extinction, vec![0.2, 0.4]);
        // float drift from a stepped slider still hits the row
        assert!(t.find(Material::Ag, 90.0, 1.0000000000000002).is_ok());
    }

    #[test]
    fn test_find_missing() {
        let t = table(vec![row(Material::Au, 90.0, 1.0, 0.1)]).unwrap();

        assert_eq!(
            t.find(Material::Au, 95.0, 1.0),
            Err(LookupError::MissingSpectrum {
                material: Material::Au,
                diameter: 95.0,
                medium_index: 1.0
            })
        );
        assert_eq!(
            t.find(Material::Si, 90.0, 1.0),
            Err(LookupError::MaterialNotLoaded(Material::Si))
        );
    }

    #[test]
    fn test_distinct_parameters() {
        let t = table(vec![
            row(Material::Cu, 110.0, 1.4, 0.1),
            row(Material::Cu, 90.0, 1.0, 0.1),
            row(Material::Cu, 90.0, 1.4, 0.1),
        ])
        .unwrap();

        assert_eq!(t.diameters(Material::Cu).unwrap(), vec![90.0, 110.0]);
        assert_eq!(t.medium_indices(Material::Cu).unwrap(), vec![1.0, 1.4]);
        assert_eq!(t.diameters_at(Material::Cu, 1.0).unwrap(), vec![90.0]);
        assert_eq!(t.medium_indices_at(Material::Cu, 110.0).unwrap(), vec![1.4]);
        assert_eq!(t.materials(), vec![Material::Cu]);
    }

    #[test]
    fn test_rejects_bad_rows() {
        let mut short = row(Material::Au, 90.0, 1.0, 0.1);
        short.extinction.pop();
        assert_eq!(
            table(vec![short]).unwrap_err(),
            TableError::RowWidth {
                row: 0,
                expected: 2,
                found: 1
            }
        );

        let err = table(vec![
            row(Material::Au, 90.0, 1.0, 0.1),
            row(Material::Au, 90.0, 1.0, 0.5),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateKey { row: 1, .. }));

        assert_eq!(table(Vec::new()).unwrap_err(), TableError::Empty);
    }
}
