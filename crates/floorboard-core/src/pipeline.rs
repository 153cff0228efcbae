//! # Quotation Pipeline Aggregation
//!
//! Folds quotations into the pipeline metrics document: outstanding
//! value, conversion rate, age profile, salesperson and store
//! leaderboards, category mix, and the recent-quote list. A drilldown
//! entry point returns the exact quotations behind any chart segment.
//!
//! Sample-only quotations are not pipeline: a customer taking samples is
//! not an opportunity yet. Their unit quantities are still tracked in
//! `sampleCount` so the merchandising team can see sample flow.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::ProductCatalog;
use crate::error::{CoreError, CoreResult};
use crate::region::{self, Region};
use crate::taxonomy::CanonicalCategory;
use crate::types::{Category, DateRange, Product, Quotation, QuotationLine, Reference};
use crate::util::{lines_by_quotation, sort_desc_by};

// =============================================================================
// Labels and Limits
// =============================================================================

/// Salesperson label for quotations without one.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Store label for quotations without a sales team.
pub const UNKNOWN_TEAM_LABEL: &str = "Unknown Team";

/// Cap on the recent-quotes list.
pub const RECENT_QUOTE_LIMIT: usize = 20;

/// Age bucket labels, youngest first. Boundaries are 30, 60 and 90 days
/// inclusive.
pub const AGE_BUCKET_LABELS: [&str; 4] = ["< 30 Days", "30-60 Days", "60-90 Days", "> 90 Days"];

const DAY_SECONDS: f64 = 86_400.0;

// =============================================================================
// Metrics Document
// =============================================================================

/// Headline pipeline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PipelineSummary {
    pub total_quotes: u32,
    pub total_value: f64,
    pub conversion_rate: f64,
    pub avg_quote_value: f64,
    /// Net sample units across the window, clamped at zero (returns can
    /// net negative).
    pub sample_count: f64,
}

/// Pipeline value in one age bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AgeBucket {
    pub name: String,
    pub value: f64,
}

/// Per-salesperson pipeline leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalespersonPipeline {
    pub name: String,
    pub value: f64,
    pub count: u32,
    pub won_count: u32,
    pub conversion_rate: f64,
    pub avg_value: f64,
}

/// Per-store (sales team) pipeline leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StorePipeline {
    pub name: String,
    pub value: f64,
    pub count: u32,
    pub avg_value: f64,
}

/// Pipeline value per canonical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryMix {
    pub category: CanonicalCategory,
    pub value: f64,
}

/// A quotation row for lists and drilldowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteSummary {
    pub id: i64,
    pub name: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount_total: f64,
    pub customer: Option<Reference>,
    pub salesperson: Option<Reference>,
    pub store: Option<Reference>,
    pub company: Option<Reference>,
}

impl QuoteSummary {
    fn from_quotation(q: &Quotation) -> Self {
        QuoteSummary {
            id: q.id,
            name: q.name.clone(),
            date: q.date,
            amount_total: q.amount_total,
            customer: q.customer.clone(),
            salesperson: q.salesperson.clone(),
            store: q.store.clone(),
            company: q.company.clone(),
        }
    }
}

/// The pipeline metrics document. Stable dashboard contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PipelineMetrics {
    pub summary: PipelineSummary,
    pub aged_quotes: Vec<AgeBucket>,
    pub by_salesperson: Vec<SalespersonPipeline>,
    pub by_store: Vec<StorePipeline>,
    pub product_mix: Vec<CategoryMix>,
    /// Real active quotations, newest first, capped at
    /// [`RECENT_QUOTE_LIMIT`].
    pub recent_quotes: Vec<QuoteSummary>,
}

// =============================================================================
// Drilldown Dimension
// =============================================================================

/// The chart dimension a drilldown request slices on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum DrilldownDimension {
    AgeBucket,
    Salesperson,
    Store,
    Category,
}

impl std::str::FromStr for DrilldownDimension {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "age" | "age-bucket" => Ok(DrilldownDimension::AgeBucket),
            "salesperson" => Ok(DrilldownDimension::Salesperson),
            "store" => Ok(DrilldownDimension::Store),
            "category" => Ok(DrilldownDimension::Category),
            other => Err(CoreError::InvalidDimension(other.to_string())),
        }
    }
}

// =============================================================================
// Aggregation
// =============================================================================

fn quotation_in_scope(
    q: &Quotation,
    window: DateRange,
    region_filter: Option<Region>,
    store_filter: Option<i64>,
) -> bool {
    if !window.contains(q.date) {
        return false;
    }
    if let Some(store_id) = store_filter {
        if q.store.as_ref().map(|r| r.id) != Some(store_id) {
            return false;
        }
    }
    if let Some(filter) = region_filter {
        let team_name = q
            .store
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or(UNKNOWN_TEAM_LABEL);
        if region::resolve(team_name) != filter {
            return false;
        }
    }
    true
}

fn salesperson_label(q: &Quotation) -> &str {
    q.salesperson
        .as_ref()
        .map(|r| r.name.as_str())
        .unwrap_or(UNASSIGNED_LABEL)
}

fn team_label(q: &Quotation) -> &str {
    q.store
        .as_ref()
        .map(|r| r.name.as_str())
        .unwrap_or(UNKNOWN_TEAM_LABEL)
}

fn age_days(q: &Quotation, now: DateTime<Utc>) -> f64 {
    (now - q.date).num_seconds() as f64 / DAY_SECONDS
}

/// Folds a quotation snapshot into [`PipelineMetrics`].
///
/// `now` is passed in rather than read from the clock so age bucketing
/// stays deterministic. A quotation is "real" if it has zero lines or at
/// least one non-sample line; only real active quotations count toward
/// value, conversion and leaderboards.
#[allow(clippy::too_many_arguments)]
pub fn compute(
    quotations: &[Quotation],
    quotation_lines: &[QuotationLine],
    categories: &[Category],
    products: &[Product],
    window: DateRange,
    now: DateTime<Utc>,
    region_filter: Option<Region>,
    store_filter: Option<i64>,
) -> PipelineMetrics {
    let catalog = ProductCatalog::build(products, categories);
    let by_quotation = lines_by_quotation(quotation_lines);

    let in_scope: Vec<&Quotation> = quotations
        .iter()
        .filter(|q| quotation_in_scope(q, window, region_filter, store_filter))
        .collect();
    let won: Vec<&Quotation> = in_scope
        .iter()
        .copied()
        .filter(|q| q.state.is_won())
        .collect();

    // Net sample units across every in-scope document, active or won.
    let mut sample_count = 0.0;
    for q in &in_scope {
        if let Some(lines) = by_quotation.get(&q.id) {
            for line in lines {
                if catalog.is_sample(&line.product) {
                    sample_count += line.quantity;
                }
            }
        }
    }

    let real_active: Vec<&Quotation> = in_scope
        .iter()
        .copied()
        .filter(|q| q.state.is_active())
        .filter(|q| {
            let lines = by_quotation.get(&q.id).map(Vec::as_slice).unwrap_or(&[]);
            lines.is_empty() || lines.iter().any(|l| !catalog.is_sample(&l.product))
        })
        .collect();

    let total_value: f64 = real_active.iter().map(|q| q.amount_untaxed).sum();
    let total_opportunities = real_active.len() + won.len();
    let conversion_rate = if total_opportunities > 0 {
        (won.len() as f64 / total_opportunities as f64) * 100.0
    } else {
        0.0
    };

    // Leaderboards keyed by display name, the way the dashboards group.
    struct SpAcc {
        value: f64,
        count: u32,
        won: u32,
        opportunities: u32,
    }
    let mut by_salesperson_map: HashMap<String, SpAcc> = HashMap::new();
    let mut by_store_map: HashMap<String, (f64, u32)> = HashMap::new();

    for q in &real_active {
        let sp = by_salesperson_map
            .entry(salesperson_label(q).to_string())
            .or_insert(SpAcc { value: 0.0, count: 0, won: 0, opportunities: 0 });
        sp.value += q.amount_untaxed;
        sp.count += 1;
        sp.opportunities += 1;

        let store = by_store_map.entry(team_label(q).to_string()).or_insert((0.0, 0));
        store.0 += q.amount_untaxed;
        store.1 += 1;
    }
    for q in &won {
        let sp = by_salesperson_map
            .entry(salesperson_label(q).to_string())
            .or_insert(SpAcc { value: 0.0, count: 0, won: 0, opportunities: 0 });
        sp.won += 1;
        sp.opportunities += 1;
    }

    let mut by_salesperson: Vec<SalespersonPipeline> = by_salesperson_map
        .into_iter()
        .map(|(name, acc)| SalespersonPipeline {
            name,
            value: acc.value,
            count: acc.count,
            won_count: acc.won,
            conversion_rate: if acc.opportunities > 0 {
                (acc.won as f64 / acc.opportunities as f64) * 100.0
            } else {
                0.0
            },
            avg_value: if acc.count > 0 {
                acc.value / acc.count as f64
            } else {
                0.0
            },
        })
        .collect();
    sort_desc_by(&mut by_salesperson, |s| s.value);

    let mut by_store: Vec<StorePipeline> = by_store_map
        .into_iter()
        .map(|(name, (value, count))| StorePipeline {
            name,
            value,
            count,
            avg_value: if count > 0 { value / count as f64 } else { 0.0 },
        })
        .collect();
    sort_desc_by(&mut by_store, |s| s.value);

    // Category mix over every line of real active quotations, samples
    // included (a sample line on a real quotation is still pipeline mix).
    let mut mix_map: HashMap<CanonicalCategory, f64> = HashMap::new();
    for q in &real_active {
        if let Some(lines) = by_quotation.get(&q.id) {
            for line in lines {
                *mix_map.entry(catalog.canonical(&line.product)).or_insert(0.0) +=
                    line.subtotal;
            }
        }
    }
    let mut product_mix: Vec<CategoryMix> = mix_map
        .into_iter()
        .map(|(category, value)| CategoryMix { category, value })
        .collect();
    sort_desc_by(&mut product_mix, |m| m.value);

    // Age profile of real active quotations.
    let mut aged = [0.0_f64; 4];
    for q in &real_active {
        let age = age_days(q, now);
        let bucket = if age <= 30.0 {
            0
        } else if age <= 60.0 {
            1
        } else if age <= 90.0 {
            2
        } else {
            3
        };
        aged[bucket] += q.amount_untaxed;
    }
    let aged_quotes: Vec<AgeBucket> = AGE_BUCKET_LABELS
        .iter()
        .zip(aged)
        .map(|(name, value)| AgeBucket {
            name: (*name).to_string(),
            value,
        })
        .collect();

    let mut recent: Vec<&Quotation> = real_active.clone();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let recent_quotes: Vec<QuoteSummary> = recent
        .iter()
        .take(RECENT_QUOTE_LIMIT)
        .map(|q| QuoteSummary::from_quotation(q))
        .collect();

    PipelineMetrics {
        summary: PipelineSummary {
            total_quotes: real_active.len() as u32,
            total_value,
            conversion_rate,
            avg_quote_value: if real_active.is_empty() {
                0.0
            } else {
                total_value / real_active.len() as f64
            },
            sample_count: sample_count.max(0.0),
        },
        aged_quotes,
        by_salesperson,
        by_store,
        product_mix,
        recent_quotes,
    }
}

// =============================================================================
// Drilldown
// =============================================================================

/// Returns the active quotations behind one chart segment.
///
/// `value` is the segment's display value: an age bucket label, a
/// salesperson name, a team name, or a canonical category label. An
/// unrecognized age label matches everything, mirroring how the charts
/// treat it; an unrecognized category label matches nothing.
#[allow(clippy::too_many_arguments)]
pub fn drilldown(
    dimension: DrilldownDimension,
    value: &str,
    quotations: &[Quotation],
    quotation_lines: &[QuotationLine],
    categories: &[Category],
    products: &[Product],
    window: DateRange,
    now: DateTime<Utc>,
    store_filter: Option<i64>,
) -> Vec<QuoteSummary> {
    let active: Vec<&Quotation> = quotations
        .iter()
        .filter(|q| q.state.is_active())
        .filter(|q| quotation_in_scope(q, window, None, store_filter))
        .collect();

    let matched: Vec<&Quotation> = match dimension {
        DrilldownDimension::AgeBucket => active
            .into_iter()
            .filter(|q| {
                let age = age_days(q, now);
                match value {
                    "< 30 Days" => age <= 30.0,
                    "30-60 Days" => age > 30.0 && age <= 60.0,
                    "60-90 Days" => age > 60.0 && age <= 90.0,
                    "> 90 Days" => age > 90.0,
                    _ => true,
                }
            })
            .collect(),
        DrilldownDimension::Salesperson => active
            .into_iter()
            .filter(|q| salesperson_label(q) == value)
            .collect(),
        DrilldownDimension::Store => active
            .into_iter()
            .filter(|q| team_label(q) == value)
            .collect(),
        DrilldownDimension::Category => {
            let catalog = ProductCatalog::build(products, categories);
            let mut matching: HashSet<i64> = HashSet::new();
            for line in quotation_lines {
                if catalog.entry(&line.product).is_some()
                    && catalog.canonical(&line.product).label() == value
                {
                    matching.insert(line.quotation.id);
                }
            }
            active
                .into_iter()
                .filter(|q| matching.contains(&q.id))
                .collect()
        }
    };

    matched.iter().map(|q| QuoteSummary::from_quotation(q)).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
