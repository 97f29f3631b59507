//! Title extraction and filename generation for package export.
//!
//! Titles come from the first markdown heading, else the first non-blank
//! line, else `"{type}-{index}"`. Filenames are sanitized titles with
//! numeric suffixes on collision.

use contextforge_config::ExportConfig;
use std::collections::HashSet;

/// Limits applied while deriving titles and filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleRules {
    pub title_max_chars: usize,
    pub max_filename_len: usize,
    pub collision_attempts: u32,
}

impl Default for TitleRules {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for TitleRules {
    fn from(config: &ExportConfig) -> Self {
        Self {
            title_max_chars: config.title_max_chars,
            max_filename_len: config.max_filename_len,
            collision_attempts: config.collision_attempts,
        }
    }
}

impl TitleRules {
    pub fn extract_title(&self, content: &str, type_tag: &str, index: usize) -> String {
        if let Some(heading) = content.lines().find_map(heading_text) {
            return heading;
        }

        if let Some(line) = content.lines().map(str::trim).find(|l| !l.is_empty()) {
            return line.chars().take(self.title_max_chars).collect();
        }

        format!("{type_tag}-{index}")
    }

    pub fn sanitize_filename(&self, title: &str) -> String {
        let lowered = title.to_lowercase();

        let mut out = String::with_capacity(lowered.len());
        let mut in_whitespace = false;
        for c in lowered.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    out.push('-');
                }
                in_whitespace = true;
                continue;
            }
            in_whitespace = false;
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
                out.push(c);
            }
        }

        let mut collapsed = String::with_capacity(out.len());
        for c in out.chars() {
            if c == '-' && collapsed.ends_with('-') {
                continue;
            }
            collapsed.push(c);
        }

        let trimmed = collapsed.strip_prefix('-').unwrap_or(&collapsed);
        let trimmed = trimmed.strip_suffix('-').unwrap_or(trimmed);
        let capped: String = trimmed.chars().take(self.max_filename_len).collect();

        if capped.is_empty() {
            "untitled".to_string()
        } else {
            capped
        }
    }

    pub fn unique_filename(&self, base: &str, ext: &str, existing: &HashSet<String>) -> String {
        let candidate = format!("{base}{ext}");
        if !existing.contains(&candidate) {
            return candidate;
        }

        for i in 1..self.collision_attempts {
            let numbered = format!("{base}-{i}{ext}");
            if !existing.contains(&numbered) {
                return numbered;
            }
        }

        format!("{base}-{}{ext}", chrono::Utc::now().timestamp_millis())
    }
}

/// Text of a markdown heading line (`#`, `##`, ... followed by whitespace).
fn heading_text(line: &str) -> Option<String> {
    let rest = line.trim_start_matches('#');
    if rest.len() == line.len() {
        return None;
    }
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_whitespace() {
        return None;
    }
    let text = chars.as_str();
    if text.is_empty() {
        return None;
    }
    Some(text.trim().to_string())
}

/// Title for a block: first heading, else first non-blank line (60 chars),
/// else `"{type_tag}-{index}"`.
pub fn extract_title(content: &str, type_tag: &str, index: usize) -> String {
    TitleRules::default().extract_title(content, type_tag, index)
}

/// Sanitize a title for use as a file stem; never returns an empty string.
pub fn sanitize_filename(title: &str) -> String {
    TitleRules::default().sanitize_filename(title)
}

/// `base + ext`, or `base-1 + ext`, `base-2 + ext`, ... whichever is unused.
pub fn unique_filename(base: &str, ext: &str, existing: &HashSet<String>) -> String {
    TitleRules::default().unique_filename(base, ext, existing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_first_heading() {
        let content = "intro line\n## Project Goals\n# Later";
        assert_eq!(extract_title(content, "note", 0), "Project Goals");
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let content = "#hashtag\nsecond";
        assert_eq!(extract_title(content, "note", 0), "#hashtag");
    }

    #[test]
    fn title_from_first_non_blank_line_truncated() {
        let long = "x".repeat(80);
        let content = format!("\n   \n{long}\nmore");
        let title = extract_title(&content, "note", 0);
        assert_eq!(title.chars().count(), 60);
    }

    #[test]
    fn title_fallback_uses_type_and_index() {
        assert_eq!(extract_title("\n  \n", "reference", 3), "reference-3");
        assert_eq!(extract_title("", "note", 0), "note-0");
    }

    #[test]
    fn sanitize_basic() {
        assert_eq!(sanitize_filename("Project Goals & Notes!"), "project-goals-notes");
        assert_eq!(sanitize_filename("  leading and trailing  "), "leading-and-trailing");
        assert_eq!(sanitize_filename("snake_case--ok"), "snake_case-ok");
    }

    #[test]
    fn sanitize_empty_becomes_untitled() {
        assert_eq!(sanitize_filename("!!!"), "untitled");
        assert_eq!(sanitize_filename(""), "untitled");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "a".repeat(120);
        assert_eq!(sanitize_filename(&long).len(), 50);
    }

    #[test]
    fn unique_filename_appends_suffix() {
        let mut used = HashSet::new();
        assert_eq!(unique_filename("x", ".md", &used), "x.md");
        used.insert("x.md".to_string());
        assert_eq!(unique_filename("x", ".md", &used), "x-1.md");
        used.insert("x-1.md".to_string());
        assert_eq!(unique_filename("x", ".md", &used), "x-2.md");
    }

    #[test]
    fn unique_filename_falls_back_to_timestamp() {
        let rules = TitleRules {
            collision_attempts: 2,
            ..TitleRules::default()
        };
        let used: HashSet<String> = ["x.md", "x-1.md"].iter().map(|s| s.to_string()).collect();
        let name = rules.unique_filename("x", ".md", &used);
        assert!(!used.contains(&name));
        assert!(name.starts_with("x-"));
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn rules_follow_export_config() {
        let config = ExportConfig {
            max_filename_len: 5,
            ..ExportConfig::default()
        };
        let rules = TitleRules::from(&config);
        assert_eq!(rules.sanitize_filename("abcdefgh"), "abcde");
    }
}
