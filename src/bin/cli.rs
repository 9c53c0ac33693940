//! OI Heatmap CLI
//!
//! Builds a heatmap from a chain snapshot and prints it as a table.
//!
//! Usage: oi-heatmap <snapshot.json> [view] [range] [group] [today]

use std::process::ExitCode;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use oi_heatmap::prelude::*;

fn run(args: &[String]) -> HeatmapResult<()> {
    let path = args
        .first()
        .ok_or_else(|| HeatmapError::invalid_input("missing snapshot path"))?;
    let view = args
        .get(1)
        .map(|s| s.parse::<ViewType>())
        .transpose()?
        .unwrap_or(ViewType::Net);
    let range = args
        .get(2)
        .map(|s| s.parse::<StrikeRange>())
        .transpose()?
        .unwrap_or(StrikeRange::Pct20);
    let group = args
        .get(3)
        .map(|s| s.parse::<ExpirationGroup>())
        .transpose()?
        .unwrap_or(ExpirationGroup::Short);
    let today = match args.get(4) {
        Some(s) => parse_expiration(s)?,
        None => Utc::now().date_naive(),
    };

    let snapshot = load_snapshot(path)?;
    let config = HeatmapConfig::new(view, range, group, snapshot.underlying_price);

    let engine = HeatmapEngine::new();
    let grid = engine.build(&snapshot.contracts, &config, today)?;
    let mapper = engine.color_mapper();

    println!("{} Open Interest Heatmap", snapshot.symbol);
    println!("==========================\n");
    println!("  Underlying: ${:.2}", snapshot.underlying_price);
    println!("  View: {} | Range: {} | Expirations: {}", view.label(), range.label(), group.label());
    println!("  As of: {}", today);
    println!("  {}", grid);
    if let Some(size) = grid.bucket_size {
        println!("  Strikes bucketed every {}", size);
    }
    println!();

    if grid.is_empty() {
        println!("No contracts match this selection.");
        return Ok(());
    }

    // Strikes down, expirations across
    print!("{:>9} |", "Strike");
    for exp in &grid.expirations {
        print!(" {:>17}", exp.format("%Y-%m-%d"));
    }
    println!();
    println!("{}", "-".repeat(11 + 18 * grid.expirations.len()));

    for (si, strike) in grid.strikes.iter().enumerate() {
        print!("{:>9.2} |", strike);
        for ei in 0..grid.expirations.len() {
            match grid.cell_at(ei, si) {
                Some(cell) if cell.has_data => {
                    let color = grid.cell_color(cell, false, &mapper);
                    print!(" {:>+8.3} {}", grid.display_value(cell), color);
                }
                _ => print!(" {:>17}", "."),
            }
        }
        println!();
    }

    let summary = summarize(&grid, &Viewport::full(&grid), 5, &RatioConfig::default());
    println!("\n--- Summary ---\n");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("usage: oi-heatmap <snapshot.json> [calls|puts|net] [10|20|30|all] [short|weekly|monthly|leaps|all] [YYYY-MM-DD]");
            ExitCode::FAILURE
        }
    }
}
