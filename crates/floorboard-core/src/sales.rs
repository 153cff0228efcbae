//! # Sales Aggregation
//!
//! Folds transactions and their lines into the sales metrics document:
//! grand totals, category/salesperson/store/region breakdowns, low-margin
//! alerts, and product leaderboards.
//!
//! ## Monetary Inclusion Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  What counts where                              │
//! │                                                                 │
//! │  Order-level totals        lines EXCLUDING samples              │
//! │  (totalSales, margin,      sample units carry zero weight       │
//! │   discounts, refunds)      in money rollups                     │
//! │                                                                 │
//! │  Category / product        EVERY line, samples included         │
//! │  rollups                   so Σ categoryBreakdown.sales equals  │
//! │                            Σ line.subtotal after filtering      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//! The divergence is intentional and load-bearing for reconciliation
//! against the raw line set.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attribution;
use crate::catalog::ProductCatalog;
use crate::region::{self, Region};
use crate::taxonomy::CanonicalCategory;
use crate::types::{
    Category, Product, ProductKind, Quotation, Reference, ReferenceExt, Transaction,
    TransactionLine,
};
use crate::util::{lines_by_transaction, pct, sort_desc_by};

// =============================================================================
// Thresholds
// =============================================================================

/// Store margin below this percent is a critical alert.
pub const STORE_MARGIN_CRITICAL_PERCENT: f64 = 40.0;

/// Store margin below this percent (but at or above critical) is a warning.
pub const STORE_MARGIN_WARNING_PERCENT: f64 = 50.0;

/// Transactions with margin below this percent raise a low-margin alert.
pub const LOW_MARGIN_ALERT_PERCENT: f64 = 30.0;

/// Minimum ex-VAT sale value for a low-margin alert. Filters out zero and
/// near-zero correction orders.
pub const MIN_ALERT_SALE_VALUE: f64 = 0.1;

/// Customer-name substrings that mark a trade account.
pub const TRADE_NAME_MARKERS: &[&str] = &["trade", "ltd", "limited", "contract"];

/// Store label used when a transaction carries no store reference.
pub const UNKNOWN_STORE_LABEL: &str = "Unknown POS";

/// Trade-account heuristic: case-insensitive substring match on the
/// customer display name. The source data has no pricelist field on the
/// transaction, so the name is all there is to go on.
pub fn is_trade_customer(customer_name: &str) -> bool {
    let lower = customer_name.to_lowercase();
    TRADE_NAME_MARKERS.iter().any(|m| lower.contains(m))
}

// =============================================================================
// Metrics Document
// =============================================================================

/// Store margin health bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AlertLevel {
    Ok,
    Warning,
    Critical,
}

/// Per-canonical-category sales rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategorySales {
    pub category: CanonicalCategory,
    pub sales: f64,
    pub margin: f64,
    pub margin_percent: f64,
    pub discounts: f64,
}

/// Per-salesperson rollup, keyed by the attributed salesperson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalespersonStats {
    pub id: i64,
    pub name: String,
    pub total_sales: f64,
    pub margin: f64,
    pub margin_percent: f64,
    pub discounts: f64,
    pub order_count: u32,
}

/// Per-store rollup with margin health and refund tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreStats {
    pub id: i64,
    pub name: String,
    pub total_sales: f64,
    pub margin: f64,
    pub margin_percent: f64,
    pub discounts: f64,
    pub refund_count: u32,
    pub refund_value: f64,
    pub alert_level: AlertLevel,
    pub region: Region,
}

/// Per-region rollup. Only the named regions get a row; `Other` stores
/// contribute to grand totals but not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegionalStats {
    pub name: String,
    pub total_sales: f64,
    pub margin: f64,
    pub margin_percent: f64,
    pub discounts: f64,
    pub order_count: u32,
}

/// A transaction whose non-sample margin fell below the alert threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LowMarginAlert {
    pub order_id: i64,
    pub order_name: String,
    pub margin_percent: f64,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub gross_total: f64,
    pub customer: Option<Reference>,
    pub sale_value: f64,
    pub is_trade: bool,
}

/// Per-product sales rollup for leaderboards and category drilldowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductStat {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub sales: f64,
    pub margin: f64,
    pub margin_percent: f64,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CanonicalCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProductKind>,
}

/// The sales metrics document. Stable dashboard contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardMetrics {
    pub total_sales: f64,
    pub total_margin: f64,
    pub total_margin_percent: f64,
    pub total_discounts: f64,
    pub total_refunds: f64,
    pub refund_count: u32,
    pub average_margin_percent: f64,
    pub trade_sales: f64,
    pub trade_sales_percent: f64,
    pub category_breakdown: Vec<CategorySales>,
    pub salesperson_stats: Vec<SalespersonStats>,
    pub store_stats: Vec<StoreStats>,
    pub regional_stats: Vec<RegionalStats>,
    pub low_margin_alerts: Vec<LowMarginAlert>,
    pub product_stats: Vec<ProductStat>,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Folds a transaction snapshot into [`DashboardMetrics`].
///
/// Single pass over transactions for order-level totals, then one pass
/// over lines for the category and product rollups, then one more over
/// transactions for low-margin alerts. Pure and deterministic: the only
/// order-sensitivity is the documented classifier table order and the
/// output sort orders.
///
/// `region_filter` drops transactions whose store resolves to a different
/// region. Stores resolving to [`Region::Other`] never match a filter.
pub fn compute(
    transactions: &[Transaction],
    lines: &[TransactionLine],
    categories: &[Category],
    products: &[Product],
    quotations_by_id: &HashMap<i64, &Quotation>,
    region_filter: Option<Region>,
) -> DashboardMetrics {
    let catalog = ProductCatalog::build(products, categories);
    let by_transaction = lines_by_transaction(lines);

    // Product leaderboard rows are seeded for every catalog product so a
    // line's accumulation is a plain map hit.
    let mut product_stats: HashMap<i64, ProductStat> = products
        .iter()
        .map(|p| {
            (
                p.id,
                ProductStat {
                    id: p.id,
                    name: p.name.clone(),
                    sku: p.sku_or_empty().to_string(),
                    sales: 0.0,
                    margin: 0.0,
                    margin_percent: 0.0,
                    quantity: 0.0,
                    category: Some(catalog.canonical_by_id(p.id)),
                    kind: Some(p.kind),
                },
            )
        })
        .collect();

    let mut total_sales = 0.0;
    let mut total_margin = 0.0;
    let mut total_discounts = 0.0;
    let mut total_refunds = 0.0;
    let mut refund_count = 0u32;
    let mut trade_sales = 0.0;

    let mut category_stats: HashMap<CanonicalCategory, (f64, f64, f64)> = HashMap::new();
    let mut salesperson_stats: HashMap<i64, SalespersonStats> = HashMap::new();
    let mut store_stats: HashMap<i64, StoreStats> = HashMap::new();
    let mut regional_stats: HashMap<Region, RegionalStats> = Region::NAMED
        .iter()
        .map(|r| {
            (
                *r,
                RegionalStats {
                    name: r.to_string(),
                    total_sales: 0.0,
                    margin: 0.0,
                    margin_percent: 0.0,
                    discounts: 0.0,
                    order_count: 0,
                },
            )
        })
        .collect();

    // Transactions dropped by the region filter. The line pass below must
    // skip their lines, but keep lines whose parent was never fetched.
    let mut excluded: HashSet<i64> = HashSet::new();

    for transaction in transactions {
        let store_name = transaction
            .store
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or(UNKNOWN_STORE_LABEL);
        let store_region = region::resolve(store_name);

        if let Some(filter) = region_filter {
            if store_region != filter {
                excluded.insert(transaction.id);
                continue;
            }
        }

        let order_lines = by_transaction
            .get(&transaction.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        // Order-level money from non-sample lines only.
        let mut order_sales = 0.0;
        let mut order_margin = 0.0;
        let mut order_discounts = 0.0;
        for line in order_lines {
            if catalog.is_sample(&line.product) {
                continue;
            }
            order_sales += line.subtotal;
            order_margin += line.margin;
            order_discounts += line.discount_amount();
        }

        if transaction.is_refund() {
            refund_count += 1;
            total_refunds += order_sales.abs();
        }

        total_sales += order_sales;
        total_margin += order_margin;
        total_discounts += order_discounts;

        let customer_name = transaction
            .customer
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("");
        if is_trade_customer(customer_name) {
            trade_sales += order_sales;
        }

        let credited = attribution::resolve(transaction, order_lines, quotations_by_id);
        let sp = salesperson_stats
            .entry(credited.id)
            .or_insert_with(|| SalespersonStats {
                id: credited.id,
                name: credited.name.clone(),
                total_sales: 0.0,
                margin: 0.0,
                margin_percent: 0.0,
                discounts: 0.0,
                order_count: 0,
            });
        sp.total_sales += order_sales;
        sp.margin += order_margin;
        sp.discounts += order_discounts;
        sp.order_count += 1;

        let store_id = transaction.store.ref_id();
        let store = store_stats.entry(store_id).or_insert_with(|| StoreStats {
            id: store_id,
            name: store_name.to_string(),
            total_sales: 0.0,
            margin: 0.0,
            margin_percent: 0.0,
            discounts: 0.0,
            refund_count: 0,
            refund_value: 0.0,
            alert_level: AlertLevel::Ok,
            region: store_region,
        });
        store.total_sales += order_sales;
        store.margin += order_margin;
        store.discounts += order_discounts;
        if transaction.is_refund() {
            store.refund_count += 1;
            store.refund_value += order_sales.abs();
        }

        if let Some(regional) = regional_stats.get_mut(&store_region) {
            regional.total_sales += order_sales;
            regional.margin += order_margin;
            regional.discounts += order_discounts;
            regional.order_count += 1;
        }
    }

    // Category and product rollups over EVERY line, samples included. A
    // line whose parent transaction was never fetched still counts.
    for line in lines {
        if region_filter.is_some() && excluded.contains(&line.transaction.id) {
            continue;
        }

        let canonical = catalog.canonical(&line.product);
        let entry = category_stats.entry(canonical).or_insert((0.0, 0.0, 0.0));
        entry.0 += line.subtotal;
        entry.1 += line.margin;
        entry.2 += line.discount_amount();

        if let Some(stat) = product_stats.get_mut(&line.product.ref_id()) {
            stat.sales += line.subtotal;
            stat.margin += line.margin;
            stat.quantity += line.quantity;
        }
    }

    let low_margin_alerts =
        low_margin_pass(transactions, &by_transaction, &catalog, &excluded, region_filter);

    // Derive percentages and order the outputs.
    let total_margin_percent = pct(total_margin, total_sales);

    let mut category_breakdown: Vec<CategorySales> = category_stats
        .into_iter()
        .map(|(category, (sales, margin, discounts))| CategorySales {
            category,
            sales,
            margin,
            margin_percent: pct(margin, sales),
            discounts,
        })
        .collect();
    sort_desc_by(&mut category_breakdown, |c| c.sales);

    let mut salesperson_stats: Vec<SalespersonStats> = salesperson_stats
        .into_values()
        .map(|mut sp| {
            sp.margin_percent = pct(sp.margin, sp.total_sales);
            sp
        })
        .collect();
    sort_desc_by(&mut salesperson_stats, |s| s.total_sales);

    let mut store_stats: Vec<StoreStats> = store_stats
        .into_values()
        .map(|mut store| {
            store.margin_percent = pct(store.margin, store.total_sales);
            store.alert_level = if store.margin_percent < STORE_MARGIN_CRITICAL_PERCENT {
                AlertLevel::Critical
            } else if store.margin_percent < STORE_MARGIN_WARNING_PERCENT {
                AlertLevel::Warning
            } else {
                AlertLevel::Ok
            };
            store
        })
        .collect();
    sort_desc_by(&mut store_stats, |s| s.total_sales);

    let regional_stats: Vec<RegionalStats> = Region::NAMED
        .iter()
        .filter_map(|r| regional_stats.remove(r))
        .map(|mut reg| {
            reg.margin_percent = pct(reg.margin, reg.total_sales);
            reg
        })
        .collect();

    let mut product_stats: Vec<ProductStat> = product_stats
        .into_values()
        .filter(|p| p.sales > 0.0 || p.quantity > 0.0)
        .map(|mut p| {
            p.margin_percent = pct(p.margin, p.sales);
            p
        })
        .collect();
    sort_desc_by(&mut product_stats, |p| p.margin);

    DashboardMetrics {
        total_sales,
        total_margin,
        total_margin_percent,
        total_discounts,
        total_refunds,
        refund_count,
        average_margin_percent: total_margin_percent,
        trade_sales,
        trade_sales_percent: pct(trade_sales, total_sales),
        category_breakdown,
        salesperson_stats,
        store_stats,
        regional_stats,
        low_margin_alerts,
        product_stats,
    }
}

/// Low-margin alert pass. Sample lines are stripped before the margin is
/// recomputed; a transaction whose lines were all samples never alerts.
fn low_margin_pass(
    transactions: &[Transaction],
    by_transaction: &HashMap<i64, Vec<&TransactionLine>>,
    catalog: &ProductCatalog<'_>,
    excluded: &HashSet<i64>,
    region_filter: Option<Region>,
) -> Vec<LowMarginAlert> {
    let mut alerts = Vec::new();

    for transaction in transactions {
        if region_filter.is_some() && excluded.contains(&transaction.id) {
            continue;
        }

        let order_lines = by_transaction
            .get(&transaction.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let real_lines: Vec<&&TransactionLine> = order_lines
            .iter()
            .filter(|l| !catalog.is_sample(&l.product))
            .collect();
        if real_lines.is_empty() {
            continue;
        }

        let margin: f64 = real_lines.iter().map(|l| l.margin).sum();
        let sale_value: f64 = real_lines.iter().map(|l| l.subtotal).sum();
        let margin_percent = pct(margin, sale_value);

        if margin_percent < LOW_MARGIN_ALERT_PERCENT && sale_value > MIN_ALERT_SALE_VALUE {
            let customer_name = transaction
                .customer
                .as_ref()
                .map(|r| r.name.as_str())
                .unwrap_or("");
            alerts.push(LowMarginAlert {
                order_id: transaction.id,
                order_name: transaction.name.clone(),
                margin_percent,
                date: transaction.date,
                gross_total: transaction.amount_total,
                customer: transaction.customer.clone(),
                sale_value,
                is_trade: is_trade_customer(customer_name),
            });
        }
    }

    // Newest first.
    alerts.sort_by(|a, b| b.date.cmp(&a.date));
    alerts
}

// =============================================================================
// Category Drilldown
// =============================================================================

/// Per-product sales within one canonical category, for the category
/// drilldown view. Same region semantics as [`compute`]; lines whose
/// product is unknown to the catalog are skipped. Sorted by sales
/// descending.
pub fn category_products(
    target: CanonicalCategory,
    transactions: &[Transaction],
    lines: &[TransactionLine],
    categories: &[Category],
    products: &[Product],
    region_filter: Option<Region>,
) -> Vec<ProductStat> {
    let catalog = ProductCatalog::build(products, categories);
    let by_transaction = lines_by_transaction(lines);

    let mut stats: HashMap<i64, ProductStat> = HashMap::new();

    for transaction in transactions {
        let store_name = transaction
            .store
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or(UNKNOWN_STORE_LABEL);
        if let Some(filter) = region_filter {
            if region::resolve(store_name) != filter {
                continue;
            }
        }

        let order_lines = by_transaction
            .get(&transaction.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for line in order_lines {
            let Some(entry) = catalog.entry(&line.product) else {
                continue;
            };
            if entry.canonical != target {
                continue;
            }

            let stat = stats.entry(entry.product.id).or_insert_with(|| ProductStat {
                id: entry.product.id,
                name: entry.product.name.clone(),
                sku: entry.product.sku_or_empty().to_string(),
                sales: 0.0,
                margin: 0.0,
                margin_percent: 0.0,
                quantity: 0.0,
                category: None,
                kind: None,
            });
            stat.sales += line.subtotal;
            stat.margin += line.margin;
            stat.quantity += line.quantity;
        }
    }

    let mut results: Vec<ProductStat> = stats
        .into_values()
        .map(|mut p| {
            p.margin_percent = pct(p.margin, p.sales);
            p
        })
        .collect();
    sort_desc_by(&mut results, |p| p.sales);
    results
}

// =============================================================================
// Unit Tests
// =============================================================================
