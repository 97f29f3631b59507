pub mod assemble;
pub mod config_cmd;
pub mod export;
pub mod import;
pub mod inspect;
pub mod stats;

use contextforge_core::{Block, BlockRecord, ConversationTurn, blocks_from_records};
use serde::Serialize;
use std::path::Path;

/// Read a JSON array of block records, dropping unrecognized zones and types.
pub fn read_blocks(path: &Path) -> Result<Vec<Block>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let records: Vec<BlockRecord> = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid block file {}: {e}", path.display()))?;
    Ok(blocks_from_records(records))
}

pub fn read_history(path: &Path) -> Result<Vec<ConversationTurn>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let turns = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid history file {}: {e}", path.display()))?;
    Ok(turns)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
