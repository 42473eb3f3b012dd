//! Precomputed Mie extinction spectra: table loading, slicing, chart payloads
//! and CSV export. The egui window lives in the `mie-viewer` binary.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod view;

pub use data::model::{Material, SpectrumRow, SpectrumTable};
pub use error::{BuildError, LookupError, TableError};
pub use view::{Selection, SpectrumView, ViewBuilder};
