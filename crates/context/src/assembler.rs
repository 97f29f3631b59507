//! Zoned context assembly.
//!
//! Turns a session's blocks into an ordered message list:
//!
//! | Order | Source | Role | Prefix |
//! |-------|--------|------|--------|
//! | 1 | Permanent zone | system | - |
//! | 2 | Stable zone | user | `Reference Material:` |
//! | 3 | Working zone | user | `Current Context:` |
//! | 4 | Conversation history | as recorded | - |
//! | 5 | New prompt | user | - |
//!
//! Empty zones emit no message; the final prompt is always present.
//! Draft blocks never take part, and `system_prompt` blocks are left out of
//! zone text because the active one is extracted separately.
//!
//! # Determinism
//!
//! Assembly is a pure function of its inputs. Input order of the blocks
//! does not matter: every zone is re-sorted by position.

use crate::token;
use contextforge_core::{Block, ContextMessage, ConversationTurn, Zone};
use serde::{Deserialize, Serialize};

const BLOCK_SEPARATOR: &str = "\n\n";
const STABLE_PREFIX: &str = "Reference Material:\n\n";
const WORKING_PREFIX: &str = "Current Context:\n\n";

// ── Types ─────────────────────────────────────────────────────────────────

/// Everything an LLM-calling collaborator needs for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledContext {
    /// Active system prompt, passed to the provider separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Zone messages, history, then the new prompt.
    pub messages: Vec<ContextMessage>,
    /// Token estimate over `messages`.
    pub estimated_tokens: u64,
}

// ── Assembly ──────────────────────────────────────────────────────────────

/// Assemble blocks and a single prompt into messages.
pub fn assemble(blocks: &[Block], user_prompt: &str) -> Vec<ContextMessage> {
    assemble_with_history(blocks, &[], user_prompt)
}

/// Assemble blocks, prior conversation turns and a new message.
pub fn assemble_with_history(
    blocks: &[Block],
    history: &[ConversationTurn],
    new_message: &str,
) -> Vec<ContextMessage> {
    let mut messages = Vec::with_capacity(4 + history.len());

    let permanent = zone_text(blocks, Zone::Permanent);
    if !permanent.is_empty() {
        messages.push(ContextMessage::system(permanent));
    }

    let stable = zone_text(blocks, Zone::Stable);
    if !stable.is_empty() {
        messages.push(ContextMessage::user(format!("{STABLE_PREFIX}{stable}")));
    }

    let working = zone_text(blocks, Zone::Working);
    if !working.is_empty() {
        messages.push(ContextMessage::user(format!("{WORKING_PREFIX}{working}")));
    }

    messages.extend(history.iter().map(ContextMessage::from));
    messages.push(ContextMessage::user(new_message));

    tracing::debug!(
        blocks = blocks.len(),
        history = history.len(),
        messages = messages.len(),
        "Assembled context"
    );
    messages
}

/// Messages, system prompt and token estimate in one call.
pub fn assemble_request(
    blocks: &[Block],
    history: &[ConversationTurn],
    new_message: &str,
) -> AssembledContext {
    let messages = assemble_with_history(blocks, history, new_message);
    let estimated_tokens = token::estimate_messages_tokens(&messages);
    AssembledContext {
        system_prompt: extract_system_prompt(blocks),
        messages,
        estimated_tokens,
    }
}

/// Content of the lowest-positioned active `system_prompt` block in the
/// Permanent zone.
pub fn extract_system_prompt(blocks: &[Block]) -> Option<String> {
    blocks
        .iter()
        .filter(|b| b.is_active() && b.zone == Zone::Permanent && b.block_type.is_system_prompt())
        .min_by(|a, b| a.cmp_position(b))
        .map(|b| b.content.clone())
}

/// Active, non-system-prompt blocks of one zone in position order, joined.
fn zone_text(blocks: &[Block], zone: Zone) -> String {
    let mut members: Vec<&Block> = blocks
        .iter()
        .filter(|b| b.zone == zone && b.is_active() && !b.block_type.is_system_prompt())
        .collect();
    members.sort_by(|a, b| a.cmp_position(b));

    members
        .iter()
        .map(|b| b.content.as_str())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

// ── Tests ─────────────────────────────────────────────────────────────────
