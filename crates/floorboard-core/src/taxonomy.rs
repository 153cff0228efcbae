//! # Canonical Product Taxonomy
//!
//! Maps a product's raw catalog category, SKU code and display name onto
//! the fixed canonical taxonomy the dashboards report against.
//!
//! ## Classification Priority
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              classify(category, sku, name) — first match wins           │
//! │                                                                         │
//! │  1. Sample marker       sku/name starts with "[sample"  → Samples      │
//! │  2. Discontinued marker sku/name/category contains                     │
//! │                         "discontinued"                   → Discontinued│
//! │  3. SKU prefix table    EW, LAM, SV, UL, FGFS, EM,                     │
//! │                         RSSV, AWP (in that order)        → per table   │
//! │  4. Category keywords   spc, lvt, lvc, laminate, carpet,               │
//! │                         engineered, solid, accessories   → per table   │
//! │  5. Fallback                                             → Other      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both tables are iterated in a fixed, documented order. A category name
//! containing several keywords resolves to the first keyword in table
//! order; reordering either table changes output and is a breaking change.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Canonical Category
// =============================================================================

/// The fixed taxonomy value a product is mapped to, independent of the
/// raw catalog category. Serialized under the display labels the
/// dashboards render (e.g. `"LVT / LVC"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CanonicalCategory {
    #[serde(rename = "SPC")]
    Spc,
    #[serde(rename = "LVT / LVC")]
    LvtLvc,
    #[serde(rename = "Laminate")]
    Laminate,
    #[serde(rename = "Carpet")]
    Carpet,
    #[serde(rename = "Engineered Wood")]
    EngineeredWood,
    #[serde(rename = "Solid Wood")]
    SolidWood,
    #[serde(rename = "Accessories")]
    Accessories,
    #[serde(rename = "Sheet Vinyl")]
    SheetVinyl,
    #[serde(rename = "Underlay")]
    Underlay,
    #[serde(rename = "Fitting")]
    Fitting,
    #[serde(rename = "Entrance Matting")]
    EntranceMatting,
    #[serde(rename = "Roll Stock Vinyl")]
    RollStockVinyl,
    #[serde(rename = "Acoustic Wall Panel")]
    AcousticWallPanel,
    #[serde(rename = "Samples")]
    Samples,
    #[serde(rename = "Discontinued")]
    Discontinued,
    #[serde(rename = "Other")]
    Other,
}

impl CanonicalCategory {
    /// Every taxonomy value, in reporting order.
    pub const ALL: [CanonicalCategory; 16] = [
        CanonicalCategory::Spc,
        CanonicalCategory::LvtLvc,
        CanonicalCategory::Laminate,
        CanonicalCategory::Carpet,
        CanonicalCategory::EngineeredWood,
        CanonicalCategory::SolidWood,
        CanonicalCategory::Accessories,
        CanonicalCategory::SheetVinyl,
        CanonicalCategory::Underlay,
        CanonicalCategory::Fitting,
        CanonicalCategory::EntranceMatting,
        CanonicalCategory::RollStockVinyl,
        CanonicalCategory::AcousticWallPanel,
        CanonicalCategory::Samples,
        CanonicalCategory::Discontinued,
        CanonicalCategory::Other,
    ];

    /// The display label dashboards render (and the serde wire value).
    pub const fn label(&self) -> &'static str {
        match self {
            CanonicalCategory::Spc => "SPC",
            CanonicalCategory::LvtLvc => "LVT / LVC",
            CanonicalCategory::Laminate => "Laminate",
            CanonicalCategory::Carpet => "Carpet",
            CanonicalCategory::EngineeredWood => "Engineered Wood",
            CanonicalCategory::SolidWood => "Solid Wood",
            CanonicalCategory::Accessories => "Accessories",
            CanonicalCategory::SheetVinyl => "Sheet Vinyl",
            CanonicalCategory::Underlay => "Underlay",
            CanonicalCategory::Fitting => "Fitting",
            CanonicalCategory::EntranceMatting => "Entrance Matting",
            CanonicalCategory::RollStockVinyl => "Roll Stock Vinyl",
            CanonicalCategory::AcousticWallPanel => "Acoustic Wall Panel",
            CanonicalCategory::Samples => "Samples",
            CanonicalCategory::Discontinued => "Discontinued",
            CanonicalCategory::Other => "Other",
        }
    }

    /// Inverse of [`label`](Self::label); used by category drilldowns
    /// where the dimension value arrives as a display label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

impl fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Classification Tables
// =============================================================================

/// SKUs and product names starting with this marker are samples.
const SAMPLE_MARKER: &str = "[sample";

/// Substring marking a discontinued product anywhere in sku/name/category.
const DISCONTINUED_MARKER: &str = "discontinued";

/// Ordered SKU-prefix table. Checked before category keywords; prefixes
/// are matched case-insensitively against the SKU.
const SKU_PREFIX_TABLE: &[(&str, CanonicalCategory)] = &[
    ("EW", CanonicalCategory::EngineeredWood),
    ("LAM", CanonicalCategory::Laminate),
    ("SV", CanonicalCategory::SheetVinyl),
    ("UL", CanonicalCategory::Underlay),
    ("FGFS", CanonicalCategory::Fitting),
    ("EM", CanonicalCategory::EntranceMatting),
    ("RSSV", CanonicalCategory::RollStockVinyl),
    ("AWP", CanonicalCategory::AcousticWallPanel),
];

/// Ordered keyword table matched as substrings of the lowercased raw
/// category name. Insertion order is load-bearing: "spc" outranks "lvt"
/// for a category named "SPC & LVT Flooring".
const CATEGORY_KEYWORD_TABLE: &[(&str, CanonicalCategory)] = &[
    ("spc", CanonicalCategory::Spc),
    ("lvt", CanonicalCategory::LvtLvc),
    ("lvc", CanonicalCategory::LvtLvc),
    ("laminate", CanonicalCategory::Laminate),
    ("carpet", CanonicalCategory::Carpet),
    ("engineered", CanonicalCategory::EngineeredWood),
    ("solid", CanonicalCategory::SolidWood),
    ("accessories", CanonicalCategory::Accessories),
];

// =============================================================================
// Classification
// =============================================================================

/// Returns true if the sku or product name marks a customer sample.
///
/// Samples carry zero weight in monetary rollups but are tracked as unit
/// counts, so several aggregators need this predicate on its own.
///
/// ## Example
/// ```rust
/// use floorboard_core::taxonomy::is_sample;
///
/// assert!(is_sample("[SAMPLE-001]", "Herringbone Oak"));
/// assert!(is_sample("", "[Sample] Herringbone Oak"));
/// assert!(!is_sample("EW-1042", "Herringbone Oak Sample Board"));
/// ```
pub fn is_sample(sku: &str, product_name: &str) -> bool {
    sku.to_lowercase().starts_with(SAMPLE_MARKER)
        || product_name.to_lowercase().starts_with(SAMPLE_MARKER)
}

/// Maps a raw (category, sku, name) triple to its canonical category.
///
/// Total over all inputs: every triple resolves to exactly one taxonomy
/// value, with `Other` as the final fallback. See the module docs for
/// the priority order.
///
/// ## Example
/// ```rust
/// use floorboard_core::taxonomy::{classify, CanonicalCategory};
///
/// assert_eq!(
///     classify("SPC Flooring", "FG-1001", "Stone Oak"),
///     CanonicalCategory::Spc
/// );
/// assert_eq!(
///     classify("Misc", "EW-220", "Chevron Walnut"),
///     CanonicalCategory::EngineeredWood
/// );
/// ```
pub fn classify(category_name: &str, sku: &str, product_name: &str) -> CanonicalCategory {
    let sku_upper = sku.to_uppercase();
    let name_lower = product_name.to_lowercase();
    let category_lower = category_name.to_lowercase();

    // 1. Samples outrank everything, including discontinued markers.
    if is_sample(sku, product_name) {
        return CanonicalCategory::Samples;
    }

    // 2. Discontinued lines are reported as their own bucket.
    if sku_upper.contains(&DISCONTINUED_MARKER.to_uppercase())
        || name_lower.contains(DISCONTINUED_MARKER)
        || category_lower.contains(DISCONTINUED_MARKER)
    {
        return CanonicalCategory::Discontinued;
    }

    // 3. SKU prefixes are authoritative over the raw category.
    for (prefix, category) in SKU_PREFIX_TABLE {
        if sku_upper.starts_with(prefix) {
            return *category;
        }
    }

    // 4. Fall back to keywords in the raw category name.
    for (keyword, category) in CATEGORY_KEYWORD_TABLE {
        if category_lower.contains(keyword) {
            return *category;
        }
    }

    CanonicalCategory::Other
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_marker_is_case_insensitive_prefix() {
        assert!(is_sample("[SAMPLE-001]", ""));
        assert!(is_sample("[sample-001]", ""));
        assert!(is_sample("", "[Sample] Oak Board"));
        // Marker must be a prefix, not a substring.
        assert!(!is_sample("X[SAMPLE]", ""));
        assert!(!is_sample("", "Oak [sample] Board"));
        assert!(!is_sample("", ""));
    }

    #[test]
    fn test_samples_outrank_all_other_rules() {
        // A sample SKU on a discontinued laminate stays a sample.
        assert_eq!(
            classify("Discontinued Laminate", "[SAMPLE-9]", "Old Laminate"),
            CanonicalCategory::Samples
        );
    }

    #[test]
    fn test_discontinued_matches_any_field() {
        assert_eq!(
            classify("Carpet", "CPT-DISCONTINUED-1", "Twist Pile"),
            CanonicalCategory::Discontinued
        );
        assert_eq!(
            classify("Carpet", "CPT-1", "Twist Pile (Discontinued)"),
            CanonicalCategory::Discontinued
        );
        assert_eq!(
            classify("Discontinued Lines", "CPT-1", "Twist Pile"),
            CanonicalCategory::Discontinued
        );
    }

    #[test]
    fn test_sku_prefix_table() {
        assert_eq!(classify("", "EW-104", ""), CanonicalCategory::EngineeredWood);
        assert_eq!(classify("", "lam-22", ""), CanonicalCategory::Laminate);
        assert_eq!(classify("", "SV20", ""), CanonicalCategory::SheetVinyl);
        assert_eq!(classify("", "UL-8", ""), CanonicalCategory::Underlay);
        assert_eq!(classify("", "FGFS-FIT", ""), CanonicalCategory::Fitting);
        assert_eq!(classify("", "EM-30", ""), CanonicalCategory::EntranceMatting);
        assert_eq!(classify("", "RSSV-2", ""), CanonicalCategory::RollStockVinyl);
        assert_eq!(classify("", "AWP-16", ""), CanonicalCategory::AcousticWallPanel);
    }

    #[test]
    fn test_sku_prefix_outranks_category_keyword() {
        // SKU says engineered wood even though the category says carpet.
        assert_eq!(
            classify("Carpet", "EW-300", "Chevron Oak"),
            CanonicalCategory::EngineeredWood
        );
    }

    #[test]
    fn test_category_keyword_order_is_deterministic() {
        // Contains both "spc" and "lvt": table order says SPC wins.
        assert_eq!(
            classify("SPC & LVT Flooring", "", ""),
            CanonicalCategory::Spc
        );
        // "lvt" before "laminate" in table order.
        assert_eq!(
            classify("Laminate-look LVT", "", ""),
            CanonicalCategory::LvtLvc
        );
    }

    #[test]
    fn test_category_keywords() {
        assert_eq!(classify("SPC Flooring", "", ""), CanonicalCategory::Spc);
        assert_eq!(classify("Luxury LVC", "", ""), CanonicalCategory::LvtLvc);
        assert_eq!(classify("All / Carpet", "", ""), CanonicalCategory::Carpet);
        assert_eq!(
            classify("Engineered Boards", "", ""),
            CanonicalCategory::EngineeredWood
        );
        assert_eq!(classify("Solid Oak", "", ""), CanonicalCategory::SolidWood);
        assert_eq!(
            classify("Trims & Accessories", "", ""),
            CanonicalCategory::Accessories
        );
    }

    #[test]
    fn test_classify_is_total() {
        // Anything unmatched lands in Other, never panics.
        assert_eq!(classify("", "", ""), CanonicalCategory::Other);
        assert_eq!(
            classify("Garden Furniture", "ZZ-1", "Deck Chair"),
            CanonicalCategory::Other
        );
    }

    #[test]
    fn test_label_round_trip() {
        for category in CanonicalCategory::ALL {
            assert_eq!(CanonicalCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(CanonicalCategory::from_label("No Such Bucket"), None);
    }
}
