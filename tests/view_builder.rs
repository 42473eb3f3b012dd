//! Integration test: build views over a complete small table and check the
//! slice shapes, lookup failures and CSV round trip.

use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::NaiveDate;

use mie_viewer::config::ViewerConfig;
use mie_viewer::data::loader::read_csv;
use mie_viewer::data::model::{Material, SpectrumTable};
use mie_viewer::data::slice::SliceAxis;
use mie_viewer::export::parse_slice_csv;
use mie_viewer::{BuildError, LookupError, Selection, ViewBuilder};

const DIAMETERS: [u32; 6] = [90, 110, 140, 150, 170, 200];
const INDICES: [&str; 5] = ["1.0", "1.4", "2.0", "2.4", "3.0"];

/// Every material × diameter × index, with values that differ per key and
/// need full precision to survive a round trip.
fn full_table() -> SpectrumTable {
    let mut csv = String::from("Material,Diameter (nm),Medium Refractive Index,400,450,500,550\n");
    for (mi, material) in Material::ALL.iter().enumerate() {
        for d in DIAMETERS {
            for n in INDICES {
                let n_val: f64 = n.parse().unwrap();
                let values: Vec<String> = (0..4)
                    .map(|k| {
                        let v = (mi as f64 + 1.0) * d as f64 / 7.0 + n_val / 3.0 + k as f64 * 1e-9;
                        v.to_string()
                    })
                    .collect();
                csv.push_str(&format!("{material},{d},{n},{}\n", values.join(",")));
            }
        }
    }
    read_csv(csv.as_bytes()).expect("table parses")
}

fn builder() -> ViewBuilder {
    ViewBuilder::new(Arc::new(full_table()), &ViewerConfig::default())
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 7, 23).unwrap()
}

#[test]
fn test_slice_row_counts_for_every_valid_selection() {
    let b = builder();
    let table = b.table();

    for material in Material::ALL {
        for &d in &table.diameters(material).unwrap() {
            for &n in &table.medium_indices(material).unwrap() {
                let sel = Selection {
                    material,
                    diameter: d,
                    medium_index: n,
                };
                let view = b
                    .build(&sel, date())
                    .unwrap_or_else(|e| panic!("{sel:?}: {e}"));

                assert_eq!(view.diameter_heatmap.grid.n_rows(), b.standard_diameters().len());
                assert_eq!(view.dielectric_heatmap.grid.n_rows(), b.standard_indices().len());
                assert_eq!(view.diameter_lines.series.len(), 5);
                assert_eq!(view.dielectric_lines.series.len(), 5);
                for s in &view.diameter_lines.series {
                    assert_eq!(s.y.len(), 4);
                }
            }
        }
    }
}

#[test]
fn test_gold_diameter_slice_rows() {
    let view = builder()
        .build(
            &Selection {
                material: Material::Au,
                diameter: 150.0,
                medium_index: 1.0,
            },
            date(),
        )
        .unwrap();
    assert_eq!(
        view.diameter_heatmap.grid.row_values,
        vec![90.0, 110.0, 140.0, 170.0, 200.0]
    );
}

#[test]
fn test_silver_dielectric_slice_rows() {
    let view = builder()
        .build(
            &Selection {
                material: Material::Ag,
                diameter: 150.0,
                medium_index: 1.0,
            },
            date(),
        )
        .unwrap();
    assert_eq!(
        view.dielectric_heatmap.grid.row_values,
        vec![1.0, 1.4, 2.0, 2.4, 3.0]
    );
    // Ag is material #2: 2 * 150 / 7 + 1.4 / 3
    assert_relative_eq!(
        view.dielectric_heatmap.grid.values[1][0],
        2.0 * 150.0 / 7.0 + 1.4 / 3.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_exports_parse_back_to_the_displayed_slices() {
    let view = builder()
        .build(
            &Selection {
                material: Material::GaP,
                diameter: 110.0,
                medium_index: 2.4,
            },
            date(),
        )
        .unwrap();

    let (axis, grid) = parse_slice_csv(&view.diameter_export.contents).unwrap();
    assert_eq!(axis, SliceAxis::Diameter);
    assert_eq!(grid, view.diameter_heatmap.grid);

    let (axis, grid) = parse_slice_csv(&view.dielectric_export.contents).unwrap();
    assert_eq!(axis, SliceAxis::MediumIndex);
    assert_eq!(grid, view.dielectric_heatmap.grid);
}

#[test]
fn test_export_filenames_follow_selection_and_date() {
    let b = builder();
    let sel = Selection {
        material: Material::GaP,
        diameter: 110.0,
        medium_index: 2.4,
    };
    let first = b.build(&sel, date()).unwrap();
    let again = b.build(&sel, date()).unwrap();

    assert_eq!(first.diameter_export.filename, "2019_7_23_Material_GaP_Env_Dielectric_2.4.csv");
    assert_eq!(first.dielectric_export.filename, "2019_7_23_Material_GaP_Diameter_110.csv");
    assert_eq!(first.diameter_export, again.diameter_export);
    assert_eq!(first.dielectric_export, again.dielectric_export);
}

#[test]
fn test_off_grid_values_are_lookup_errors() {
    let b = builder();

    // diameter slider at 160 nm: the dielectric sweep has nothing to show
    let err = b
        .build(
            &Selection {
                material: Material::Cu,
                diameter: 160.0,
                medium_index: 1.0,
            },
            date(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Lookup(LookupError::MissingSpectrum { material: Material::Cu, .. })
    ));

    // index slider at 1.6
    let err = b
        .build(
            &Selection {
                material: Material::Cu,
                diameter: 150.0,
                medium_index: 1.6,
            },
            date(),
        )
        .unwrap_err();
    assert!(err.to_string().contains("medium index 1.6"), "{err}");
}

#[test]
fn test_unknown_material_name() {
    let err = "Unobtainium".parse::<Material>().unwrap_err();
    assert_eq!(err, LookupError::UnknownMaterial("Unobtainium".into()));
}
