//! Headless export of one selection.
//!
//! ```sh
//! mie_export --data fullconcat.csv --material Au --diameter 150 --index 1.0 --out exports/
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use mie_viewer::config;
use mie_viewer::data::loader;
use mie_viewer::data::model::Material;
use mie_viewer::data::slice::{format_diameter, format_medium_index};
use mie_viewer::view::{Selection, ViewBuilder};

#[derive(Parser)]
#[command(name = "mie_export")]
#[command(about = "Write the diameter and dielectric slices of one selection as CSV")]
#[command(version)]
struct Args {
    /// Spectrum table (.csv or .parquet). Falls back to `data_path` in the config.
    #[arg(short, long)]
    data: Option<PathBuf>,
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    material: String,
    /// Diameter in nm, fixed for the dielectric slice.
    #[arg(long)]
    diameter: f64,
    /// Medium refractive index, fixed for the diameter slice.
    #[arg(long)]
    index: f64,
    /// Output directory (overrides `export_dir` in the config).
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Date used in the filenames, YYYY-MM-DD. Default: today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Also write the complete view payload as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = config::load_or_default(args.config.as_deref())?;
    let data = args
        .data
        .or_else(|| config.data_path.clone())
        .context("no spectrum table given (use --data or set data_path in the config)")?;
    let out_dir = args
        .out
        .or_else(|| config.export_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let material: Material = args.material.parse()?;
    let selection = Selection {
        material,
        diameter: args.diameter,
        medium_index: args.index,
    };
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let table = loader::load_file(&data)?;
    let builder = ViewBuilder::new(Arc::new(table), &config);
    let view = builder.build(&selection, date)?;

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    for export in [&view.diameter_export, &view.dielectric_export] {
        let path = export.write_to(&out_dir)?;
        println!("{}", path.display());
    }

    if args.json {
        let path = out_dir.join(format!(
            "{}_Material_{}_View_n{}_d{}.json",
            date.format("%Y_%-m_%-d"),
            material,
            format_medium_index(selection.medium_index),
            format_diameter(selection.diameter)
        ));
        let json = serde_json::to_string_pretty(&view).context("serialising view")?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote view payload to {}", path.display());
        println!("{}", path.display());
    }

    Ok(())
}
