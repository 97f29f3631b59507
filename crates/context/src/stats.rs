//! Per-zone block statistics.

use contextforge_core::{Block, Zone};
use serde::{Deserialize, Serialize};

/// Count and character total for one zone (or all zones).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneStat {
    pub count: usize,
    /// Unicode scalar values, matching token estimation.
    pub chars: usize,
}

impl ZoneStat {
    fn add(&mut self, block: &Block) {
        self.count += 1;
        self.chars += block.content.chars().count();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStats {
    pub permanent: ZoneStat,
    pub stable: ZoneStat,
    pub working: ZoneStat,
    pub total: ZoneStat,
}

impl ContextStats {
    pub fn zone(&self, zone: Zone) -> ZoneStat {
        match zone {
            Zone::Permanent => self.permanent,
            Zone::Stable => self.stable,
            Zone::Working => self.working,
        }
    }

    fn zone_mut(&mut self, zone: Zone) -> &mut ZoneStat {
        match zone {
            Zone::Permanent => &mut self.permanent,
            Zone::Stable => &mut self.stable,
            Zone::Working => &mut self.working,
        }
    }
}

/// Statistics over every non-draft block.
pub fn context_stats(blocks: &[Block]) -> ContextStats {
    let mut stats = ContextStats::default();
    for block in blocks.iter().filter(|b| b.is_active()) {
        stats.zone_mut(block.zone).add(block);
        stats.total.add(block);
    }
    stats
}
