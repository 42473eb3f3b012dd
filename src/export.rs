//! CSV encoding of slices and the dated export filenames.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::data::model::Material;
use crate::data::slice::{Grid, Slice, SliceAxis};

/// A ready-to-save CSV document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
}

impl CsvExport {
    pub fn from_slice(slice: &Slice, date: NaiveDate) -> Result<Self> {
        Ok(CsvExport {
            filename: export_filename(date, slice.material, slice.axis, slice.fixed),
            contents: slice_to_csv(slice)?,
        })
    }

    /// Write into `dir` under the generated filename.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        self.write_as(&path)?;
        Ok(path)
    }

    /// Write to an explicit path (e.g. one picked in a save dialog).
    pub fn write_as(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.contents.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {}", path.display());
        Ok(())
    }
}

/// `{year}_{month}_{day}_Material_{material}_{tag}_{value}.csv`
///
/// `tag` names the parameter held fixed: a diameter sweep is labelled with its
/// medium index (`Env_Dielectric_1.0`), an index sweep with its diameter
/// (`Diameter_150`). Month and day are not zero padded.
pub fn export_filename(date: NaiveDate, material: Material, axis: SliceAxis, fixed: f64) -> String {
    let (tag, value) = match axis {
        SliceAxis::Diameter => ("Env_Dielectric", SliceAxis::MediumIndex.format_value(fixed)),
        SliceAxis::MediumIndex => ("Diameter", SliceAxis::Diameter.format_value(fixed)),
    };
    format!(
        "{}_{}_{}_Material_{}_{}_{}.csv",
        date.year(),
        date.month(),
        date.day(),
        material,
        tag,
        value
    )
}

/// Header = index label + wavelength labels; one record per row value.
pub fn slice_to_csv(slice: &Slice) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(slice.grid.wavelength_labels.len() + 1);
    header.push(slice.axis.index_label().to_string());
    header.extend(slice.grid.wavelength_labels.iter().cloned());
    writer.write_record(&header).context("writing CSV header")?;

    for (value, row) in slice.grid.row_values.iter().zip(&slice.grid.values) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(slice.axis.format_value(*value));
        // shortest round-trip form; exponent notation for very small or large values
        record.extend(row.iter().map(|v| format!("{v:?}")));
        writer.write_record(&record).context("writing CSV row")?;
    }

    let bytes = writer.into_inner().context("flushing CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Parse a CSV written by [`slice_to_csv`] back into its axis and grid.
pub fn parse_slice_csv(text: &str) -> Result<(SliceAxis, Grid)> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let Some(index_label) = headers.get(0) else {
        bail!("empty CSV header");
    };
    let axis = SliceAxis::from_index_label(index_label)
        .with_context(|| format!("unknown index column '{index_label}'"))?;

    let wavelength_labels: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let wavelengths = wavelength_labels
        .iter()
        .map(|l| {
            l.trim()
                .parse::<f64>()
                .with_context(|| format!("column header '{l}' is not a wavelength"))
        })
        .collect::<Result<Vec<f64>>>()?;

    let mut row_values = Vec::new();
    let mut values = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut cells = record.iter().map(|c| {
            c.trim()
                .parse::<f64>()
                .with_context(|| format!("CSV row {row_no}: '{c}' is not a number"))
        });
        match cells.next() {
            Some(v) => row_values.push(v?),
            None => bail!("CSV row {row_no} is empty"),
        }
        values.push(cells.collect::<Result<Vec<f64>>>()?);
    }

    Ok((
        axis,
        Grid {
            row_values,
            wavelengths,
            wavelength_labels,
            values,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 7, 3).unwrap()
    }

    fn slice(axis: SliceAxis, fixed: f64) -> Slice {
        Slice {
            material: Material::Au,
            axis,
            fixed,
            grid: Grid {
                row_values: vec![90.0, 110.0],
                wavelengths: vec![400.0, 402.5],
                wavelength_labels: vec!["400".into(), "402.5".into()],
                values: vec![vec![0.1, 1.0 / 3.0], vec![2.5e-17, 12345.678901234567]],
            },
        }
    }

    #[test]
    fn test_filename_patterns() {
        assert_eq!(
            export_filename(date(), Material::Au, SliceAxis::Diameter, 1.0),
            "2019_7_3_Material_Au_Env_Dielectric_1.0.csv"
        );
        assert_eq!(
            export_filename(date(), Material::GaAs, SliceAxis::MediumIndex, 150.0),
            "2019_7_3_Material_GaAs_Diameter_150.csv"
        );
        assert_eq!(
            export_filename(date(), Material::Si, SliceAxis::Diameter, 2.4),
            "2019_7_3_Material_Si_Env_Dielectric_2.4.csv"
        );
    }

    #[test]
    fn test_filename_is_deterministic() {
        let a = export_filename(date(), Material::Ag, SliceAxis::MediumIndex, 90.0);
        let b = export_filename(date(), Material::Ag, SliceAxis::MediumIndex, 90.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_csv_layout() {
        let csv = slice_to_csv(&slice(SliceAxis::Diameter, 1.0)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Diameter (nm),400,402.5"));
        assert!(lines.next().unwrap().starts_with("90,0.1,"));
        assert!(lines.next().unwrap().starts_with("110,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_tiny_values_use_exponent() {
        let csv = slice_to_csv(&slice(SliceAxis::Diameter, 1.0)).unwrap();
        let row = csv.lines().nth(2).unwrap();
        assert_eq!(row, "110,2.5e-17,12345.678901234567");
    }

    #[test]
    fn test_csv_index_sweep_header() {
        let mut s = slice(SliceAxis::MediumIndex, 150.0);
        s.grid.row_values = vec![1.0, 1.4];
        let csv = slice_to_csv(&s).unwrap();
        assert!(csv.starts_with("Medium Refractive Index,400,402.5\n1.0,"));
    }

    #[test]
    fn test_csv_parses_back_exactly() {
        let s = slice(SliceAxis::Diameter, 1.0);
        let csv = slice_to_csv(&s).unwrap();
        let (axis, grid) = parse_slice_csv(&csv).unwrap();
        assert_eq!(axis, SliceAxis::Diameter);
        assert_eq!(grid, s.grid);
    }

    #[test]
    fn test_parse_rejects_foreign_csv() {
        let err = parse_slice_csv("Wavelength,400\n1,2\n").unwrap_err();
        assert!(err.to_string().contains("unknown index column"));
    }

    #[test]
    fn test_write_to_dir() {
        let dir = std::env::temp_dir().join(format!("mie-viewer-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let export = CsvExport::from_slice(&slice(SliceAxis::Diameter, 1.0), date()).unwrap();
        let path = export.write_to(&dir).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "2019_7_3_Material_Au_Env_Dielectric_1.0.csv"
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), export.contents);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
