use thiserror::Error;

use crate::data::model::Material;

/// Failure to find the rows a selection asks for.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("unknown material '{0}' (expected one of Au, Ag, Al, Cu, GaAs, GaN, GaP, Si, Ge)")]
    UnknownMaterial(String),

    #[error("no spectra loaded for material {0}")]
    MaterialNotLoaded(Material),

    #[error("no spectrum for {material} at diameter {diameter} nm, medium index {medium_index}")]
    MissingSpectrum {
        material: Material,
        diameter: f64,
        medium_index: f64,
    },
}

/// Structural problems found while assembling a
/// [`SpectrumTable`](crate::data::model::SpectrumTable).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("table has no wavelength columns")]
    NoWavelengths,

    #[error("table has no rows")]
    Empty,

    #[error("row {row}: expected {expected} extinction values, found {found}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: duplicate entry for {material} at diameter {diameter} nm, medium index {medium_index}")]
    DuplicateKey {
        row: usize,
        material: Material,
        diameter: f64,
        medium_index: f64,
    },
}

/// Why a view could not be produced for a selection.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("encoding export: {0:#}")]
    Export(anyhow::Error),
}
