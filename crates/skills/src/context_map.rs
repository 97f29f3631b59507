//! Context-map resolver.
//!
//! A `context-map.yaml` describes several import steps drawn from one
//! package:
//!
//! ```yaml
//! contexts:
//!   research:
//!     label: Research
//!     permanent: [references/permanent/rules.md]
//!     stable: [references/stable/sources.md]
//!   draft:
//!     label: Draft
//!     working: [references/working/outline.md]
//!     depends_on: [research]
//!     output: draft.md
//! ```
//!
//! Resolution validates every context, checks file and dependency
//! references, then returns the contexts ordered so each one follows all
//! of its dependencies.

use contextforge_core::{ContextMapError, Zone};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One resolved step of a context map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMapContext {
    pub key: String,
    pub label: String,
    pub permanent: Vec<String>,
    pub stable: Vec<String>,
    pub working: Vec<String>,
    /// Parsed and validated; not consumed by import.
    pub optional_stable: Vec<String>,
    pub depends_on: Vec<String>,
    /// Informational only, never checked against the package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ContextMapContext {
    /// The file list assigned to one zone.
    pub fn zone_files(&self, zone: Zone) -> &[String] {
        match zone {
            Zone::Permanent => &self.permanent,
            Zone::Stable => &self.stable,
            Zone::Working => &self.working,
        }
    }

    /// Every referenced path: permanent, stable, working, optional stable.
    pub fn referenced_files(&self) -> impl Iterator<Item = &String> {
        self.permanent
            .iter()
            .chain(&self.stable)
            .chain(&self.working)
            .chain(&self.optional_stable)
    }

    fn from_raw(key: String, raw: &Mapping) -> Result<Self, ContextMapError> {
        let label = match raw.get("label") {
            Some(Value::String(label)) if !label.is_empty() => label.clone(),
            _ => return Err(ContextMapError::MissingLabel { key }),
        };

        Ok(Self {
            label,
            permanent: string_list(raw.get("permanent")),
            stable: string_list(raw.get("stable")),
            working: string_list(raw.get("working")),
            optional_stable: string_list(raw.get("optional_stable")),
            depends_on: string_list(raw.get("depends_on")),
            output: match raw.get("output") {
                Some(Value::String(output)) => Some(output.clone()),
                _ => None,
            },
            key,
        })
    }
}

/// Parse, validate and topologically order a context map.
///
/// Every path listed by a context must be in `available_files`.
pub fn resolve_context_map(
    text: &str,
    available_files: &BTreeSet<String>,
) -> Result<Vec<ContextMapContext>, ContextMapError> {
    let root: Value =
        serde_yaml::from_str(text).map_err(|e| ContextMapError::InvalidSyntax(e.to_string()))?;

    let raw_contexts = match root.get("contexts") {
        None => return Err(ContextMapError::MissingContexts),
        Some(value) if is_falsy(value) => return Err(ContextMapError::MissingContexts),
        Some(Value::Mapping(contexts)) => contexts,
        Some(_) => return Err(ContextMapError::ContextsNotMapping),
    };

    if raw_contexts.is_empty() {
        return Err(ContextMapError::EmptyContexts);
    }

    let keys: Vec<String> = raw_contexts.keys().map(key_to_string).collect();
    let known: HashSet<&str> = keys.iter().map(String::as_str).collect();

    let mut contexts = Vec::with_capacity(keys.len());
    for (key, raw) in keys.iter().zip(raw_contexts.values()) {
        let Value::Mapping(raw) = raw else {
            return Err(ContextMapError::InvalidContext {
                key: key.clone(),
                reason: "must be a mapping".into(),
            });
        };

        let context = ContextMapContext::from_raw(key.clone(), raw)?;

        if let Some(dependency) = context
            .depends_on
            .iter()
            .find(|dep| !known.contains(dep.as_str()))
        {
            return Err(ContextMapError::UnknownDependency {
                key: key.clone(),
                dependency: dependency.clone(),
            });
        }

        contexts.push(context);
    }

    if let Some(path) = contexts
        .iter()
        .flat_map(ContextMapContext::referenced_files)
        .find(|path| !available_files.contains(*path))
    {
        return Err(ContextMapError::FileNotFound { path: path.clone() });
    }

    let ordered = topological_order(contexts)?;
    tracing::debug!(
        contexts = ordered.len(),
        order = ?ordered.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
        "Resolved context map"
    );
    Ok(ordered)
}

// ── Ordering ────────────────────────────────────────────────────────────

/// Depth-first ordering over `contexts` in declaration order.
fn topological_order(
    contexts: Vec<ContextMapContext>,
) -> Result<Vec<ContextMapContext>, ContextMapError> {
    let index: HashMap<String, usize> = contexts
        .iter()
        .enumerate()
        .map(|(i, c)| (c.key.clone(), i))
        .collect();

    let mut walk = Walk {
        contexts: &contexts,
        index: &index,
        visiting: HashSet::new(),
        visited: HashSet::new(),
        order: Vec::with_capacity(contexts.len()),
    };
    for i in 0..contexts.len() {
        walk.visit(i)?;
    }

    let order = walk.order;
    let mut slots: Vec<Option<ContextMapContext>> = contexts.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

struct Walk<'a> {
    contexts: &'a [ContextMapContext],
    index: &'a HashMap<String, usize>,
    visiting: HashSet<usize>,
    visited: HashSet<usize>,
    order: Vec<usize>,
}

impl Walk<'_> {
    /// Post-order DFS from `start` on an explicit stack of
    /// `(context, next dependency)` frames.
    fn visit(&mut self, start: usize) -> Result<(), ContextMapError> {
        if self.visited.contains(&start) {
            return Ok(());
        }
        let contexts = self.contexts;
        self.visiting.insert(start);
        let mut stack = vec![(start, 0usize)];

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let deps = &contexts[node].depends_on;

            if top.1 < deps.len() {
                let dep = &deps[top.1];
                top.1 += 1;
                // Unknown dependencies were rejected before ordering.
                let Some(&d) = self.index.get(dep) else {
                    continue;
                };
                if self.visited.contains(&d) {
                    continue;
                }
                if !self.visiting.insert(d) {
                    return Err(ContextMapError::CircularDependency {
                        key: contexts[d].key.clone(),
                    });
                }
                stack.push((d, 0));
            } else {
                stack.pop();
                self.visiting.remove(&node);
                self.visited.insert(node);
                self.order.push(node);
            }
        }
        Ok(())
    }
}

// ── Raw value helpers ───────────────────────────────────────────────────

/// String entries of a YAML sequence; anything else yields an empty list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// `null`, `false`, zero and the empty string count as absent.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
