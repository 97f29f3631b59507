//! Primary document (`SKILL.md`) parser.
//!
//! Format:
//!
//! ```text
//! ---
//! name: my-skill
//! description: "What it does"
//! ---
//!
//! # Body
//! Free-form markdown...
//! ```
//!
//! The header is a flat list of `key: value` lines; keys are
//! case-insensitive and unknown keys are ignored. Only `name` is required.

use contextforge_core::DocumentError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DELIMITER: &str = "---";

/// Header fields of a primary document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMetadata {
    pub skill_name: String,
    pub skill_description: String,
}

/// A parsed primary document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDocument {
    /// Body text after the closing delimiter, trimmed.
    pub content: String,
    pub metadata: SkillMetadata,
}

/// Parse a primary document.
///
/// `fallback_name` is used as the description when the header has none.
pub fn parse_document(raw: &str, fallback_name: Option<&str>) -> Result<SkillDocument, DocumentError> {
    let trimmed = raw.trim();

    let after_open = trimmed
        .strip_prefix(DELIMITER)
        .ok_or(DocumentError::MissingFrontmatter)?;

    let closing = after_open
        .find(DELIMITER)
        .ok_or(DocumentError::MissingClosingDelimiter)?;

    let header = after_open[..closing].trim();
    let body = after_open[closing + DELIMITER.len()..].trim();

    let fields = parse_header(header);

    let name = fields
        .get("name")
        .filter(|name| !name.is_empty())
        .cloned()
        .ok_or(DocumentError::MissingName)?;

    let description = fields
        .get("description")
        .filter(|d| !d.is_empty())
        .cloned()
        .or_else(|| fallback_name.map(str::to_string))
        .unwrap_or_default();

    Ok(SkillDocument {
        content: body.to_string(),
        metadata: SkillMetadata {
            skill_name: name,
            skill_description: description,
        },
    })
}

/// Parse `key: value` lines. Lines without a colon are skipped; a repeated
/// key keeps its last value.
fn parse_header(header: &str) -> HashMap<String, String> {
    header
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_lowercase(), unquote(value.trim())))
        .collect()
}

/// Strip one layer of matching surrounding quotes.
fn unquote(s: &str) -> String {
    for quote in ['"', '\''] {
        if s.starts_with(quote) && s.ends_with(quote) {
            // A lone quote character is both prefix and suffix.
            if s.len() == 1 {
                return String::new();
            }
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}
