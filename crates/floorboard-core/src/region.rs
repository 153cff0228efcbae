//! # Region Resolution
//!
//! Maps a store display name onto its geographic region. The table is an
//! ordered substring scan over the lowercased store name; first match
//! wins. Stores resolving to `Other` are excluded from the named
//! regional rollups but always included in grand totals.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Region
// =============================================================================

/// Geographic region derived from a store display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Region {
    North,
    South,
    /// Unrecognized store; kept in grand totals only.
    Other,
}

impl Region {
    /// The named regions that get their own rollup rows.
    pub const NAMED: [Region; 2] = [Region::North, Region::South];
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::North => write!(f, "North"),
            Region::South => write!(f, "South"),
            Region::Other => write!(f, "Other"),
        }
    }
}

// =============================================================================
// Resolution Table
// =============================================================================

/// Ordered substring table; scanned top to bottom against the lowercased
/// store name. Reordering changes output and is a breaking change.
const REGION_TABLE: &[(&str, Region)] = &[
    ("basildon", Region::North),
    ("hull", Region::North),
    ("doncaster", Region::North),
    ("derby", Region::North),
    ("nottingham", Region::North),
    ("cardiff 1", Region::South),
    ("cardiff 2", Region::South),
    ("merthyr", Region::South),
    ("swansea", Region::South),
    ("hedgend", Region::South),
    ("hedge end", Region::South),
    ("cd1", Region::South),
    ("cd2", Region::South),
];

/// Resolves a store display name to its region.
///
/// ## Example
/// ```rust
/// use floorboard_core::region::{resolve, Region};
///
/// assert_eq!(resolve("Nottingham Store"), Region::North);
/// assert_eq!(resolve("Cardiff 1"), Region::South);
/// assert_eq!(resolve("Random Town"), Region::Other);
/// ```
pub fn resolve(store_name: &str) -> Region {
    let lower = store_name.to_lowercase();
    for (needle, region) in REGION_TABLE {
        if lower.contains(needle) {
            return *region;
        }
    }
    Region::Other
}

// =============================================================================
// Unit Tests
// =============================================================================
