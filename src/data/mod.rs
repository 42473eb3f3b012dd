/// Data layer: core types, loading, and slicing.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SpectrumTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ SpectrumTable  │  rows keyed by (material, diameter, medium index)
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  slice    │  fix one parameter, sweep the other → Grid
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod slice;
