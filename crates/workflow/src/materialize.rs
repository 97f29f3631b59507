//! Step materialization: build the blocks of a workflow step's session.

use contextforge_core::{Block, Step, Template, Zone};
use std::collections::HashMap;

/// Blocks for the session of `step`.
///
/// Active blocks of `previous` in the step's carry-forward zones are copied
/// with their positions. The template's blocks follow, per zone, positioned
/// after the last carried block of that zone. Returned blocks are unsaved
/// (no ids) and ordered by zone, then position.
pub fn materialize_step(previous: &[Block], step: &Step, template: Option<&Template>) -> Vec<Block> {
    let carry = step.carry_forward_zones();

    let mut blocks: Vec<Block> = previous
        .iter()
        .filter(|b| b.is_active() && carry.contains(&b.zone))
        .map(|b| Block {
            id: String::new(),
            ..b.clone()
        })
        .collect();

    if let Some(template) = template {
        let mut next_position: HashMap<Zone, f64> = HashMap::new();
        for block in &blocks {
            let next = next_position.entry(block.zone).or_insert(0.0);
            *next = next.max(block.position + 1.0);
        }

        let mut snapshot: Vec<_> = template.blocks.iter().collect();
        snapshot.sort_by(|a, b| a.position.total_cmp(&b.position));

        for template_block in snapshot {
            let mut block = template_block.to_block();
            let next = next_position.entry(block.zone).or_insert(0.0);
            block.position = *next;
            *next += 1.0;
            blocks.push(block);
        }
    }

    blocks.sort_by(|a, b| a.cmp_zone_position(b));
    tracing::debug!(
        step = %step.name,
        blocks = blocks.len(),
        template = template.is_some(),
        "Materialized workflow step"
    );
    blocks
}
