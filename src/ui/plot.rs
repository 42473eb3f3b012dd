use eframe::egui::{self, ColorImage, Rect, Sense, TextureHandle, TextureOptions, Ui, pos2, vec2};
use egui_plot::{Legend, Line, Plot, PlotImage, PlotPoint, PlotPoints};

use mie_viewer::view::{Heatmap, LineChart};

use super::color32;
use crate::state::{AppState, HeatmapTextures};

/// Vertical resolution of the smoothed heatmap texture.
const HEATMAP_ROWS: usize = 128;

// ---------------------------------------------------------------------------
// Central panel: title + 2×2 chart grid
// ---------------------------------------------------------------------------

/// Render the page title, the two line charts and the two heatmaps.
pub fn spectrum_charts(ui: &mut Ui, state: &mut AppState) {
    if state.builder.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a spectrum table to begin  (File → Open…)");
        });
        return;
    }

    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No spectra for the current selection");
        });
        return;
    };

    ui.heading(&view.title);
    ui.separator();

    let textures = state.textures.get_or_insert_with(|| HeatmapTextures {
        diameter: upload_heatmap(ui.ctx(), "diameter_heatmap", &view.diameter_heatmap),
        dielectric: upload_heatmap(ui.ctx(), "dielectric_heatmap", &view.dielectric_heatmap),
    });

    // two chart rows, each with a title line (and a colour bar under the heatmaps)
    let chart_height = ((ui.available_height() - 90.0) / 2.0).max(120.0);

    ui.columns(2, |cols: &mut [Ui]| {
        line_chart(&mut cols[0], "diameter_lines", &view.diameter_lines, chart_height);
        line_chart(&mut cols[1], "dielectric_lines", &view.dielectric_lines, chart_height);
    });
    ui.columns(2, |cols: &mut [Ui]| {
        heatmap_chart(
            &mut cols[0],
            "diameter_heatmap",
            &view.diameter_heatmap,
            &textures.diameter,
            chart_height,
        );
        heatmap_chart(
            &mut cols[1],
            "dielectric_heatmap",
            &view.dielectric_heatmap,
            &textures.dielectric,
            chart_height,
        );
    });
}

// ---------------------------------------------------------------------------
// Line charts
// ---------------------------------------------------------------------------

fn line_chart(ui: &mut Ui, id: &str, chart: &LineChart, height: f32) {
    ui.strong(&chart.title);
    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series
                    .x
                    .iter()
                    .zip(series.y.iter())
                    .map(|(&x, &y)| [x, y])
                    .collect();

                let line = Line::new(points)
                    .name(&series.name)
                    .color(color32(series.color))
                    .width(series.width);

                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmaps
// ---------------------------------------------------------------------------

/// Rasterise a heatmap: one texel column per wavelength, rows interpolated
/// along the parameter axis.
fn heatmap_image(heatmap: &Heatmap) -> ColorImage {
    let rows = heatmap.resample_rows(HEATMAP_ROWS);
    let width = heatmap.grid.wavelengths.len();
    let (lo, hi) = heatmap.grid.value_range().unwrap_or((0.0, 1.0));

    let mut rgb = Vec::with_capacity(width * rows.len() * 3);
    for row in &rows {
        for &v in row {
            let c = heatmap.scale.map(v, lo, hi);
            rgb.extend_from_slice(&[c.0, c.1, c.2]);
        }
    }
    ColorImage::from_rgb([width, rows.len()], &rgb)
}

fn upload_heatmap(ctx: &egui::Context, name: &str, heatmap: &Heatmap) -> TextureHandle {
    ctx.load_texture(name, heatmap_image(heatmap), TextureOptions::LINEAR)
}

fn heatmap_chart(ui: &mut Ui, id: &str, heatmap: &Heatmap, texture: &TextureHandle, height: f32) {
    ui.strong(&heatmap.title);

    let grid = &heatmap.grid;
    let (x0, x1) = span(&grid.wavelengths);
    let (y0, y1) = span(&grid.row_values);

    Plot::new(id)
        .height(height)
        .x_axis_label(heatmap.x_label)
        .y_axis_label(heatmap.y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let center = PlotPoint::new((x0 + x1) / 2.0, (y0 + y1) / 2.0);
            let size = vec2((x1 - x0) as f32, (y1 - y0) as f32);
            plot_ui.image(PlotImage::new(texture, center, size));
        });

    if let Some((lo, hi)) = grid.value_range() {
        color_bar(ui, heatmap, lo, hi);
    }
}

/// Min/max of an axis, widened by one unit when degenerate.
fn span(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if hi - lo < f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn color_bar(ui: &mut Ui, heatmap: &Heatmap, lo: f64, hi: f64) {
    const STEPS: usize = 48;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{lo:.3e}"));
        let (rect, _) = ui.allocate_exact_size(vec2(180.0, 12.0), Sense::hover());
        let painter = ui.painter_at(rect);
        let w = rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let left = rect.left() + w * i as f32;
            let cell = Rect::from_min_max(pos2(left, rect.top()), pos2(left + w, rect.bottom()));
            let c = heatmap.scale.sample(i as f64 / (STEPS - 1) as f64);
            painter.rect_filled(cell, 0.0, color32(c));
        }
        ui.label(format!("{hi:.3e}"));
    });
}
