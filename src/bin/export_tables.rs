use std::path::PathBuf;

use anyhow::{Context, Result};

use fifa_dashboard::config::{self, DashboardConfig};
use fifa_dashboard::dataset;
use fifa_dashboard::export::export_tables_with_progress;

const DEFAULT_OUT: &str = "fifa_tables.xlsx";

fn parse_out_arg() -> PathBuf {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if arg == "--out" {
            if let Some(path) = args.get(idx + 1) {
                return PathBuf::from(path);
            }
        }
        if let Some(rest) = arg.strip_prefix("--out=") {
            return PathBuf::from(rest);
        }
    }
    PathBuf::from(DEFAULT_OUT)
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut cfg = DashboardConfig::from_env()?;
    if let Some(path) = config::parse_dataset_arg() {
        cfg.dataset_path = path;
    }
    let out = parse_out_arg();

    let players = dataset::load_players(&cfg.dataset_path)
        .with_context(|| format!("load dataset {}", cfg.dataset_path.display()))?;
    println!("Loaded {} players from {}", players.len(), cfg.dataset_path.display());

    let report = export_tables_with_progress(&out, &players, |progress| {
        println!("[{}/{}] {}", progress.current, progress.total, progress.message);
    })?;

    println!(
        "Export written: {} ({} sheets, {} rows)",
        out.display(),
        report.sheets,
        report.rows
    );
    if !report.errors.is_empty() {
        println!("Skipped tables:");
        for err in &report.errors {
            println!("  - {err}");
        }
    }
    Ok(())
}
