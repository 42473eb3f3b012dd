use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Material, SpectrumRow, SpectrumTable};

pub const MATERIAL_COLUMN: &str = "Material";
pub const DIAMETER_COLUMN: &str = "Diameter (nm)";
pub const MEDIUM_INDEX_COLUMN: &str = "Medium Refractive Index";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a spectrum table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one row per (material, diameter, medium index), one column per wavelength
/// * `.parquet` – the same wide layout written by Pandas or Polars
pub fn load_file(path: &Path) -> Result<SpectrumTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(file)
        }
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::info!(
        "Loaded {} spectra ({} wavelengths, materials {:?}) from {}",
        table.len(),
        table.wavelengths().len(),
        table.materials(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Column layout shared by both formats
// ---------------------------------------------------------------------------

/// Where the key columns and wavelength columns sit in a header row.
#[derive(Debug)]
struct ColumnLayout {
    material: usize,
    diameter: usize,
    medium_index: usize,
    /// (column position, wavelength in nm, header text)
    wavelengths: Vec<(usize, f64, String)>,
}

impl ColumnLayout {
    fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim() == name)
                .with_context(|| format!("missing '{name}' column"))
        };
        let material = find(MATERIAL_COLUMN)?;
        let diameter = find(DIAMETER_COLUMN)?;
        let medium_index = find(MEDIUM_INDEX_COLUMN)?;

        let mut wavelengths = Vec::new();
        for (i, h) in headers.iter().enumerate() {
            let h = h.as_ref().trim();
            if i == material || i == diameter || i == medium_index || is_index_column(h) {
                continue;
            }
            let nm: f64 = h
                .parse()
                .with_context(|| format!("column header '{h}' is not a wavelength"))?;
            wavelengths.push((i, nm, h.to_string()));
        }
        if wavelengths.is_empty() {
            bail!("no wavelength columns found");
        }

        Ok(ColumnLayout {
            material,
            diameter,
            medium_index,
            wavelengths,
        })
    }

    fn into_table(self, rows: Vec<SpectrumRow>) -> Result<SpectrumTable> {
        let (nm, labels) = self
            .wavelengths
            .into_iter()
            .map(|(_, nm, label)| (nm, label))
            .unzip();
        Ok(SpectrumTable::from_rows(nm, labels, rows)?)
    }
}

/// A leftover DataFrame index: `df.to_csv()` writes an unnamed column,
/// `df.to_parquet()` writes `__index_level_N__` for a non-default index.
fn is_index_column(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed:") || header.starts_with("__index_level_")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with `Material`, `Diameter (nm)`,
/// `Medium Refractive Index` and one numeric header per wavelength sample.
pub fn read_csv<R: Read>(source: R) -> Result<SpectrumTable> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let layout = ColumnLayout::from_headers(headers.as_slice())?;

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let material: Material = cell(layout.material)
            .parse()
            .with_context(|| format!("CSV row {row_no}"))?;
        let diameter = parse_number(cell(layout.diameter), row_no, DIAMETER_COLUMN)?;
        let medium_index = parse_number(cell(layout.medium_index), row_no, MEDIUM_INDEX_COLUMN)?;

        let extinction = layout
            .wavelengths
            .iter()
            .map(|(idx, _, label)| parse_number(cell(*idx), row_no, label))
            .collect::<Result<Vec<f64>>>()?;

        rows.push(SpectrumRow {
            material,
            diameter,
            medium_index,
            extinction,
        });
    }

    layout.into_table(rows)
}

fn parse_number(s: &str, row: usize, col: &str) -> Result<f64> {
    s.parse::<f64>()
        .with_context(|| format!("CSV row {row}, column '{col}': '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same wide layout as the CSV.
///
/// Key columns may be Utf8/LargeUtf8 (`Material`) and any of
/// Int32/Int64/Float32/Float64 (diameter, index, wavelengths).
fn load_parquet(path: &Path) -> Result<SpectrumTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let field_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = ColumnLayout::from_headers(field_names.as_slice())?;

    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    let mut offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let row_no = offset + row;
            let material: Material = string_value(batch.column(layout.material), row)
                .and_then(|s| Ok(s.parse::<Material>()?))
                .with_context(|| format!("Row {row_no}: bad '{MATERIAL_COLUMN}'"))?;
            let diameter = numeric_value(batch.column(layout.diameter), row)
                .with_context(|| format!("Row {row_no}: bad '{DIAMETER_COLUMN}'"))?;
            let medium_index = numeric_value(batch.column(layout.medium_index), row)
                .with_context(|| format!("Row {row_no}: bad '{MEDIUM_INDEX_COLUMN}'"))?;

            let extinction = layout
                .wavelengths
                .iter()
                .map(|(idx, _, label)| {
                    numeric_value(batch.column(*idx), row)
                        .with_context(|| format!("Row {row_no}: bad '{label}'"))
                })
                .collect::<Result<Vec<f64>>>()?;

            rows.push(SpectrumRow {
                material,
                diameter,
                medium_index,
                extinction,
            });
        }
        offset += batch.num_rows();
    }

    layout.into_table(rows)
}

// -- Parquet / Arrow helpers --

fn string_value(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("expected a string column, got {other:?}"),
    }
}

fn numeric_value(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    let v = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        other => bail!("expected a numeric column, got {other:?}"),
    };
    Ok(v)
}
