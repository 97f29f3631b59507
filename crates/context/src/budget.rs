//! Token budget utilization per zone.

use contextforge_config::BudgetConfig;
use contextforge_core::{Block, Zone};
use serde::{Deserialize, Serialize};

/// Token usage against one budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetUsage {
    pub tokens: u64,
    pub budget: u64,
    /// 0.0–100.0, may exceed 100 when over budget.
    pub utilization_pct: f32,
    pub over_budget: bool,
}

impl BudgetUsage {
    fn new(tokens: u64, budget: u64) -> Self {
        let utilization_pct = if budget == 0 {
            0.0
        } else {
            (tokens as f32 / budget as f32) * 100.0
        };
        Self {
            tokens,
            budget,
            utilization_pct,
            over_budget: tokens > budget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub permanent: BudgetUsage,
    pub stable: BudgetUsage,
    pub working: BudgetUsage,
    pub total: BudgetUsage,
}

impl BudgetReport {
    pub fn zone(&self, zone: Zone) -> BudgetUsage {
        match zone {
            Zone::Permanent => self.permanent,
            Zone::Stable => self.stable,
            Zone::Working => self.working,
        }
    }

    /// Zones (and the total) that exceed their budget.
    pub fn over_budget(&self) -> bool {
        self.total.over_budget || Zone::ALL.iter().any(|z| self.zone(*z).over_budget)
    }
}

/// Token usage of every non-draft block against the configured budgets.
pub fn budget_report(blocks: &[Block], budgets: &BudgetConfig) -> BudgetReport {
    let zone_tokens = |zone: Zone| -> u64 {
        blocks
            .iter()
            .filter(|b| b.is_active() && b.zone == zone)
            .map(Block::token_count)
            .sum()
    };

    let permanent = zone_tokens(Zone::Permanent);
    let stable = zone_tokens(Zone::Stable);
    let working = zone_tokens(Zone::Working);

    let report = BudgetReport {
        permanent: BudgetUsage::new(permanent, budgets.permanent),
        stable: BudgetUsage::new(stable, budgets.stable),
        working: BudgetUsage::new(working, budgets.working),
        total: BudgetUsage::new(permanent + stable + working, budgets.total),
    };

    if report.over_budget() {
        tracing::warn!(
            permanent = report.permanent.tokens,
            stable = report.stable.tokens,
            working = report.working.tokens,
            "Context exceeds token budget"
        );
    }
    report
}
