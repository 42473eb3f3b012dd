mod app;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::anyhow;
use app::MieViewerApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

#[derive(Parser)]
#[command(name = "mie-viewer")]
#[command(about = "Browse precomputed Mie extinction spectra")]
#[command(version)]
struct Args {
    /// Spectrum table to open (.csv or .parquet). Overrides `data_path` in the config.
    data: Option<PathBuf>,
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = mie_viewer::config::load_or_default(args.config.as_deref())?;
    let data = args.data.or_else(|| config.data_path.clone());

    let mut state = AppState::new(config, chrono::Local::now().date_naive());
    if let Some(path) = data {
        state.load_path(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Mie Extinction Spectra",
        options,
        Box::new(|_cc| Ok(Box::new(MieViewerApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
