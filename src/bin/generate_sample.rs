//! Write a synthetic spectrum table for trying out the viewer.
//!
//! ```sh
//! generate_sample                  # sample_spectra.csv
//! generate_sample demo.parquet     # Arrow / Parquet
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use mie_viewer::data::loader::{DIAMETER_COLUMN, MATERIAL_COLUMN, MEDIUM_INDEX_COLUMN};
use mie_viewer::data::model::Material;

/// Rough dipole resonance (nm) and linewidth (nm) of a small particle in vacuum.
fn resonance(material: Material) -> (f64, f64) {
    match material {
        Material::Au => (520.0, 60.0),
        Material::Ag => (400.0, 35.0),
        Material::Al => (320.0, 45.0),
        Material::Cu => (560.0, 70.0),
        Material::GaAs => (610.0, 50.0),
        Material::GaN => (380.0, 40.0),
        Material::GaP => (450.0, 45.0),
        Material::Si => (480.0, 40.0),
        Material::Ge => (650.0, 80.0),
    }
}

fn lorentzian(x: f64, center: f64, width: f64) -> f64 {
    let half = width / 2.0;
    half * half / ((x - center).powi(2) + half * half)
}

/// Peak red-shifts and broadens with size and medium index; amplitude grows
/// with particle volume.
fn extinction(material: Material, diameter: f64, n_env: f64, wavelength: f64) -> f64 {
    let (base, width) = resonance(material);
    let center = base * (1.0 + 0.35 * (n_env - 1.0)) + 1.2 * diameter;
    let width = width * (1.0 + diameter / 120.0);
    let amplitude = (diameter / 100.0).powi(3);
    // weaker quadrupole on the blue side for larger particles
    let quad = 0.3 * (diameter / 200.0).powi(2) * lorentzian(wavelength, 0.7 * center, 0.6 * width);
    amplitude * (lorentzian(wavelength, center, width) + quad)
}

struct Sample {
    wavelengths: Vec<f64>,
    keys: Vec<(Material, i64, f64)>,
    rows: Vec<Vec<f64>>,
}

fn generate() -> Sample {
    // 300 → 1000 nm, step 5
    let wavelengths: Vec<f64> = (0..=140).map(|i| 300.0 + i as f64 * 5.0).collect();
    let diameters: Vec<i64> = (1..=20).map(|i| i * 10).collect();
    // 1.0 → 3.0, step 0.2
    let indices: Vec<f64> = (0..=10).map(|i| (10.0 + 2.0 * i as f64) / 10.0).collect();

    let mut keys = Vec::new();
    let mut rows = Vec::new();
    for material in Material::ALL {
        for &d in &diameters {
            for &n in &indices {
                keys.push((material, d, n));
                rows.push(
                    wavelengths
                        .iter()
                        .map(|&wl| extinction(material, d as f64, n, wl))
                        .collect(),
                );
            }
        }
    }
    Sample {
        wavelengths,
        keys,
        rows,
    }
}

fn wavelength_label(wl: f64) -> String {
    format!("{}", wl as i64)
}

fn write_csv(sample: &Sample, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;

    let mut header = vec![
        MATERIAL_COLUMN.to_string(),
        DIAMETER_COLUMN.to_string(),
        MEDIUM_INDEX_COLUMN.to_string(),
    ];
    header.extend(sample.wavelengths.iter().map(|&wl| wavelength_label(wl)));
    writer.write_record(&header)?;

    for ((material, d, n), row) in sample.keys.iter().zip(&sample.rows) {
        let mut record = vec![material.to_string(), d.to_string(), format!("{n:.1}")];
        record.extend(row.iter().map(|v| format!("{v:?}")));
        writer.write_record(&record)?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(sample: &Sample, path: &Path) -> Result<()> {
    let mut fields = vec![
        Field::new(MATERIAL_COLUMN, DataType::Utf8, false),
        Field::new(DIAMETER_COLUMN, DataType::Int64, false),
        Field::new(MEDIUM_INDEX_COLUMN, DataType::Float64, false),
    ];
    fields.extend(
        sample
            .wavelengths
            .iter()
            .map(|&wl| Field::new(wavelength_label(wl), DataType::Float64, false)),
    );
    let schema = Arc::new(Schema::new(fields));

    let materials: Vec<&str> = sample.keys.iter().map(|(m, _, _)| m.name()).collect();
    let diameters: Vec<i64> = sample.keys.iter().map(|&(_, d, _)| d).collect();
    let indices: Vec<f64> = sample.keys.iter().map(|&(_, _, n)| n).collect();

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(materials)),
        Arc::new(Int64Array::from(diameters)),
        Arc::new(Float64Array::from(indices)),
    ];
    for j in 0..sample.wavelengths.len() {
        let column: Vec<f64> = sample.rows.iter().map(|row| row[j]).collect();
        columns.push(Arc::new(Float64Array::from(column)));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_spectra.csv"));

    let sample = generate();

    let is_parquet = matches!(
        output_path.extension().and_then(|e| e.to_str()),
        Some("parquet") | Some("pq")
    );
    if is_parquet {
        write_parquet(&sample, &output_path)?;
    } else {
        write_csv(&sample, &output_path)?;
    }

    println!(
        "Wrote {} spectra ({} wavelengths each) to {}",
        sample.rows.len(),
        sample.wavelengths.len(),
        output_path.display()
    );
    Ok(())
}
