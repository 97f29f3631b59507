//! Zone model - the three fixed partitions a session's blocks live in.
//!
//! Zones have a total order `Permanent < Stable < Working` which drives
//! both assembly precedence and the numeric rank used for sorting/export.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A partition of a session's blocks.
///
/// The derived `Ord` follows declaration order, which is the precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Zone {
    /// Rules, identity, system-level instructions. Assembled as a system message.
    Permanent,
    /// Reference material that rarely changes.
    Stable,
    /// Current, frequently changing context.
    Working,
}

/// Zones copied from one workflow step's session into the next by default.
pub const DEFAULT_CARRY_FORWARD: [Zone; 2] = [Zone::Permanent, Zone::Working];

impl Zone {
    /// All zones in precedence order.
    pub const ALL: [Zone; 3] = [Zone::Permanent, Zone::Stable, Zone::Working];

    /// Numeric precedence rank (0 = first assembled).
    pub fn rank(self) -> u8 {
        match self {
            Zone::Permanent => 0,
            Zone::Stable => 1,
            Zone::Working => 2,
        }
    }

    /// Default token budget for a zone when the session configures none.
    pub fn default_budget(self) -> u64 {
        match self {
            Zone::Permanent => 50_000,
            Zone::Stable => 100_000,
            Zone::Working => 100_000,
        }
    }

    /// Wire spelling, e.g. `"PERMANENT"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Permanent => "PERMANENT",
            Zone::Stable => "STABLE",
            Zone::Working => "WORKING",
        }
    }

    /// Directory name used under `references/` in a package.
    pub fn dir_name(self) -> &'static str {
        match self {
            Zone::Permanent => "permanent",
            Zone::Stable => "stable",
            Zone::Working => "working",
        }
    }
}

/// Default token budget for the whole session.
pub const DEFAULT_TOTAL_BUDGET: u64 = 500_000;

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownZone(pub String);

impl fmt::Display for UnknownZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown zone: {}", self.0)
    }
}

impl std::error::Error for UnknownZone {}

impl FromStr for Zone {
    type Err = UnknownZone;

    /// Case-insensitive: `"permanent"`, `"PERMANENT"` and `"Permanent"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permanent" => Ok(Zone::Permanent),
            "stable" => Ok(Zone::Stable),
            "working" => Ok(Zone::Working),
            _ => Err(UnknownZone(s.to_string())),
        }
    }
}
