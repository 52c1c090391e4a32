use anyhow::{Context, Result, bail};

use fifa_dashboard::config::{self, DashboardConfig};
use fifa_dashboard::dataset;
use fifa_dashboard::similarity::find_similar;

fn parse_query_arg() -> Option<String> {
    let mut args = std::env::args().skip(1);
    let mut words = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--dataset" {
            args.next();
            continue;
        }
        if arg.starts_with("--dataset=") {
            continue;
        }
        words.push(arg);
    }
    let query = words.join(" ");
    (!query.trim().is_empty()).then_some(query)
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let Some(query) = parse_query_arg() else {
        bail!("usage: similar_players [--dataset <csv>] <player name>");
    };

    let mut cfg = DashboardConfig::from_env()?;
    if let Some(path) = config::parse_dataset_arg() {
        cfg.dataset_path = path;
    }
    let players = dataset::load_players(&cfg.dataset_path)
        .with_context(|| format!("load dataset {}", cfg.dataset_path.display()))?;

    let result = find_similar(&players, &query)?;
    if result.candidates > 1 {
        println!(
            "\"{}\" matched {} players; using {}",
            result.query,
            result.candidates,
            result.query_entry().map(|e| e.name.as_str()).unwrap_or("?")
        );
    }

    println!("Players similar to {}:", result.query);
    for entry in &result.entries {
        let marker = if entry.is_query { " (query)" } else { "" };
        println!("  {:<32} {:.3}{}", entry.name, entry.similarity, marker);
    }
    Ok(())
}
