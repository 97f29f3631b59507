//! `contextforge stats` - Zone statistics and budget usage.

use super::{print_json, read_blocks};
use contextforge_config::AppConfig;
use contextforge_context::{BudgetReport, ContextStats, budget_report, context_stats};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct StatsOutput {
    stats: ContextStats,
    budget: BudgetReport,
}

pub async fn run(blocks: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let blocks = read_blocks(blocks)?;

    let output = StatsOutput {
        stats: context_stats(&blocks),
        budget: budget_report(&blocks, &config.budgets),
    };
    if output.budget.over_budget() {
        eprintln!("⚠️  Session is over its token budget");
    }
    print_json(&output)
}
