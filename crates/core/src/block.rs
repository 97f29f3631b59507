//! Block domain types.
//!
//! A block is a positioned, typed unit of text that belongs to exactly one
//! zone of one session. Positions are `f64`: sparse or fractional values are
//! allowed and every reader re-sorts by position.

use crate::error::BlockError;
use crate::message::estimate_tokens;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Open-ended block type tag (`"note"`, `"skill"`, `"reference"`, ...).
///
/// Callers may introduce new tags, so this is a validated string rather
/// than a closed enum: lowercase ASCII letters, digits, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockType(String);

impl BlockType {
    pub const NOTE: &'static str = "note";
    pub const SYSTEM_PROMPT: &'static str = "system_prompt";
    pub const SKILL: &'static str = "skill";
    pub const REFERENCE: &'static str = "reference";

    pub fn new(tag: impl Into<String>) -> Result<Self, BlockError> {
        let tag = tag.into();
        let valid = !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if valid {
            Ok(Self(tag))
        } else {
            Err(BlockError::InvalidType(tag))
        }
    }

    pub fn note() -> Self {
        Self(Self::NOTE.into())
    }

    pub fn system_prompt() -> Self {
        Self(Self::SYSTEM_PROMPT.into())
    }

    pub fn skill() -> Self {
        Self(Self::SKILL.into())
    }

    pub fn reference() -> Self {
        Self(Self::REFERENCE.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_system_prompt(&self) -> bool {
        self.0 == Self::SYSTEM_PROMPT
    }

    pub fn is_skill(&self) -> bool {
        self.0 == Self::SKILL
    }
}

impl TryFrom<String> for BlockType {
    type Error = BlockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlockType> for String {
    fn from(value: BlockType) -> Self {
        value.0
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where imported content came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Local,
    Upload,
    Url,
}

/// Optional provenance attached to imported blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_skill_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceKind>,

    /// Package-relative path the content was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

/// A single block of session content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Store-assigned id; empty until persisted.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub content: String,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    pub zone: Zone,

    /// Order within the zone; lower sorts first.
    pub position: f64,

    /// Drafts are excluded from assembly and statistics.
    #[serde(default)]
    pub is_draft: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BlockMetadata>,
}

impl Block {
    /// Create a non-draft block; token counts are computed from the content.
    pub fn new(content: impl Into<String>, block_type: BlockType, zone: Zone, position: f64) -> Self {
        let content = content.into();
        let tokens = estimate_tokens(&content);
        Self {
            id: String::new(),
            content,
            block_type,
            zone,
            position,
            is_draft: false,
            tokens: Some(tokens),
            original_tokens: Some(tokens),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: BlockMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn as_draft(mut self) -> Self {
        self.is_draft = true;
        self
    }

    /// Replace the content and recompute `tokens`. `original_tokens` is kept.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.tokens = Some(estimate_tokens(&self.content));
    }

    /// Stored token count, or an estimate when the store never counted.
    pub fn token_count(&self) -> u64 {
        self.tokens.unwrap_or_else(|| estimate_tokens(&self.content))
    }

    /// Whether the block takes part in assembly and statistics.
    pub fn is_active(&self) -> bool {
        !self.is_draft
    }

    /// Position comparison that tolerates NaN.
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.position.total_cmp(&other.position)
    }

    /// Export ordering: zone rank first, then position.
    pub fn cmp_zone_position(&self, other: &Self) -> Ordering {
        self.zone
            .rank()
            .cmp(&other.zone.rank())
            .then_with(|| self.cmp_position(other))
    }
}

/// A block as handed over by a loosely-typed store: zone and type are
/// plain strings that may not (yet) be valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    #[serde(default)]
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub zone: String,
    pub position: f64,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default)]
    pub original_tokens: Option<u64>,
    #[serde(default)]
    pub metadata: Option<BlockMetadata>,
}

impl BlockRecord {
    /// Convert into a typed block; `None` if the zone or type is unrecognized.
    pub fn into_block(self) -> Option<Block> {
        let zone: Zone = self.zone.parse().ok()?;
        let block_type = BlockType::new(self.block_type).ok()?;
        Some(Block {
            id: self.id,
            content: self.content,
            block_type,
            zone,
            position: self.position,
            is_draft: self.is_draft,
            tokens: self.tokens,
            original_tokens: self.original_tokens,
            metadata: self.metadata,
        })
    }
}

/// Convert store records, dropping those with an unrecognized zone or type.
pub fn blocks_from_records(records: Vec<BlockRecord>) -> Vec<Block> {
    records
        .into_iter()
        .filter_map(|record| {
            let zone = record.zone.clone();
            let block = record.into_block();
            if block.is_none() {
                tracing::debug!(zone = %zone, "Skipping block with unrecognized zone or type");
            }
            block
        })
        .collect()
}
