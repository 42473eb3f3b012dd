use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use mie_viewer::data::model::Material;
use mie_viewer::data::slice::{format_diameter, format_medium_index};
use mie_viewer::export::CsvExport;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selection");
    ui.separator();

    ui.strong("Material");
    let mut material = state.selection.material;
    egui::ComboBox::from_id_salt("material")
        .selected_text(material.name())
        .show_ui(ui, |ui: &mut Ui| {
            for m in Material::ALL {
                ui.selectable_value(&mut material, m, m.name());
            }
        });
    state.set_material(material);
    ui.add_space(8.0);

    // ---- Medium index: fixes the diameter sweep ----
    ui.strong("Medium refractive index");
    let s = state.config.index_slider;
    let mut n = state.selection.medium_index;
    if ui
        .add(egui::Slider::new(&mut n, s.min..=s.max).step_by(s.step).text("n_env"))
        .changed()
    {
        state.set_medium_index(n);
    }
    ui.add_space(8.0);

    // ---- Diameter: fixes the index sweep ----
    ui.strong("Diameter");
    let s = state.config.diameter_slider;
    let mut d = state.selection.diameter;
    if ui
        .add(
            egui::Slider::new(&mut d, s.min..=s.max)
                .step_by(s.step)
                .suffix(" nm"),
        )
        .changed()
    {
        state.set_diameter(d);
    }

    ui.separator();

    // ---- What the table actually holds ----
    match state.available_values() {
        Some((diameters, indices)) => {
            let list = |vals: &[f64], fmt: fn(f64) -> String| {
                vals.iter().map(|&v| fmt(v)).collect::<Vec<_>>().join(", ")
            };
            egui::CollapsingHeader::new(RichText::new("Available in table").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label(format!("Diameters (nm): {}", list(&diameters, format_diameter)));
                    ui.label(format!("Indices: {}", list(&indices, format_medium_index)));
                });
        }
        None if state.builder.is_some() => {
            ui.label(format!("No spectra for {}.", state.selection.material));
        }
        None => {
            ui.label("No dataset loaded.");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();

            let exports = state
                .view
                .as_ref()
                .map(|v| (v.diameter_export.clone(), v.dielectric_export.clone()));
            let (diameter, dielectric) = match exports {
                Some((a, b)) => (Some(a), Some(b)),
                None => (None, None),
            };
            if ui
                .add_enabled(diameter.is_some(), egui::Button::new("Export diameter slice…"))
                .clicked()
            {
                if let Some(export) = &diameter {
                    save_export_dialog(state, export);
                }
                ui.close_menu();
            }
            if ui
                .add_enabled(dielectric.is_some(), egui::Button::new("Export dielectric slice…"))
                .clicked()
            {
                if let Some(export) = &dielectric {
                    save_export_dialog(state, export);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("Export date");
        let mut date = state.export_date;
        ui.add(DatePickerButton::new(&mut date));
        if date != state.export_date {
            state.set_export_date(date);
        }

        ui.separator();

        if let (Some(builder), Some(source)) = (&state.builder, &state.source) {
            let table = builder.table();
            ui.label(format!(
                "{}: {} spectra, {} wavelengths",
                source.display(),
                table.len(),
                table.wavelengths().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spectrum table")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn save_export_dialog(state: &mut AppState, export: &CsvExport) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export slice as CSV")
        .set_file_name(export.filename.as_str())
        .add_filter("CSV", &["csv"]);
    if let Some(dir) = &state.config.export_dir {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.save_file() {
        if let Err(e) = export.write_as(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
