//! `contextforge assemble` - Build the messages for a block snapshot.

use super::{print_json, read_blocks, read_history};
use contextforge_context::assemble_request;
use std::path::Path;

pub async fn run(
    blocks: &Path,
    prompt: &str,
    history: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let blocks = read_blocks(blocks)?;
    let history = match history {
        Some(path) => read_history(path)?,
        None => Vec::new(),
    };

    let assembled = assemble_request(&blocks, &history, prompt);
    tracing::debug!(
        blocks = blocks.len(),
        history = history.len(),
        tokens = assembled.estimated_tokens,
        "Assembled request"
    );
    print_json(&assembled)
}
