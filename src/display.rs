use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use lottomind::repository::HistoricalDataset;
use lottomind::strategy::{BallStats, EnsembleReport, StrategyKind};
use lottomind::types::StrategyResult;

/// Steps of the backfill progress bar (one per permille)
const PROGRESS_STEPS: u64 = 1000;

pub fn display_status(dataset: &HistoricalDataset) {
    println!("Draws stored: {}", dataset.len());
    if let (Some(first), Some(last)) = (dataset.first(), dataset.last()) {
        println!("First draw:   {}", first.date);
        println!("Last draw:    {}", last);
    }
}

pub fn stats_table(stats: &[BallStats], top: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Ball", "Frequency", "Lag", "Score"]);

    for stat in stats.iter().take(top) {
        table.add_row(vec![
            format!("{:2}", stat.ball),
            stat.frequency.to_string(),
            stat.lag.to_string(),
            format!("{:.3}", stat.score),
        ]);
    }

    table
}

pub fn display_stats(stats: &[BallStats], top: usize) {
    println!("\n📊 Ball frequencies\n");
    println!("{}", stats_table(stats, top));
}

fn numbers_cell(result: &StrategyResult) -> String {
    result
        .numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn ensemble_table(report: &EnsembleReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Strategy", "Numbers", "Reintegro"]);

    for (kind, result) in &report.results {
        table.add_row(vec![
            Cell::new(kind.name()),
            Cell::new(numbers_cell(result)),
            Cell::new(result.reintegro),
        ]);
    }
    table.add_row(vec![
        Cell::new("consensus").fg(Color::Green),
        Cell::new(numbers_cell(&report.consensus)).fg(Color::Green),
        Cell::new(report.consensus.reintegro).fg(Color::Green),
    ]);

    table
}

pub fn display_ensemble(report: &EnsembleReport) {
    println!("{}", ensemble_table(report));
}

pub fn display_single(kind: StrategyKind, result: &StrategyResult) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Strategy", "Numbers", "Reintegro"]);
    table.add_row(vec![
        kind.name().to_string(),
        numbers_cell(result),
        result.reintegro.to_string(),
    ]);
    println!("{table}");
}

/// Progress bar driven by the backfill's completed fraction
pub fn backfill_progress() -> ProgressBar {
    let pb = ProgressBar::new(PROGRESS_STEPS);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb
}

pub fn update_progress(pb: &ProgressBar, fraction: f64, label: &str) {
    pb.set_position((fraction.clamp(0.0, 1.0) * PROGRESS_STEPS as f64).round() as u64);
    pb.set_message(label.to_string());
}
