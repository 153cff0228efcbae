//! # Stock Aggregation
//!
//! Folds the product catalog, the period's sales lines, and scrap records
//! into the inventory metrics document: valuation, top-seller lists,
//! stock alerts, write-off tracking, and restock suggestions.
//!
//! Alert priority per stockable product, first match wins:
//! ```text
//! on_hand <= 0                               out_of_stock
//! on_hand <  required lead stock             critical_lead (long-lead SKU)
//!                                            low           (otherwise)
//! on_hand > 0, zero period sales, >= 14d     slow_mover
//! ```
//! Service products never alert.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::ProductCatalog;
use crate::region::{self, Region};
use crate::taxonomy::CanonicalCategory;
use crate::types::{
    Category, Product, ProductKind, ReferenceExt, ScrapRecord, Transaction, TransactionLine,
};
use crate::util::{lines_by_transaction, pct, sort_desc_by};

// =============================================================================
// Thresholds
// =============================================================================

/// SKU prefix marking an extended replenishment cycle.
pub const LONG_LEAD_SKU_PREFIX: &str = "EG-";

/// Weeks of cover required for long-lead SKUs.
pub const LONG_LEAD_WEEKS: f64 = 16.0;

/// Weeks of cover required for everything else.
pub const STANDARD_LEAD_WEEKS: f64 = 2.0;

/// Slow-mover detection needs at least this many days of history.
pub const SLOW_MOVER_MIN_PERIOD_DAYS: u32 = 14;

/// Cap on each top-seller list.
pub const TOP_LIST_LIMIT: usize = 10;

/// Cap on the stock alert list.
pub const MAX_STOCK_ALERTS: usize = 50;

/// Restock suggestions require on-hand at or below this level.
pub const RESTOCK_MAX_STOCK: f64 = 2.0;

/// Restock suggestions require at least this much period revenue.
pub const RESTOCK_MIN_REVENUE: f64 = 1000.0;

/// SKU shown for products without one.
pub const MISSING_SKU_LABEL: &str = "N/A";

// =============================================================================
// Metrics Document
// =============================================================================

/// Stock alert category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockAlertStatus {
    Low,
    OutOfStock,
    SlowMover,
    CriticalLead,
}

/// A product's period sales joined with its stock position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductStockStat {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: f64,
    pub revenue: f64,
    pub margin: f64,
    pub margin_percent: f64,
    pub stock_level: f64,
    pub forecasted_stock: f64,
    pub kind: ProductKind,
}

/// Valuation rollup per canonical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockValue {
    pub category: CanonicalCategory,
    pub value: f64,
    /// Every product mapped to the category, valued or not.
    pub item_count: u32,
}

/// An inventory alert for a stockable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAlert {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub status: StockAlertStatus,
    pub current_stock: f64,
    pub forecasted_stock: f64,
    pub avg_weekly_sales: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A stock write-off valued at the product's unit cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ScrapStat {
    pub product_id: i64,
    pub name: String,
    pub quantity: f64,
    pub value: f64,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

/// The inventory metrics document. Stable dashboard contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockMetrics {
    pub top_by_quantity: Vec<ProductStockStat>,
    pub top_by_revenue: Vec<ProductStockStat>,
    pub top_by_margin: Vec<ProductStockStat>,
    pub valuation_by_category: Vec<StockValue>,
    pub total_valuation: f64,
    pub alerts: Vec<StockAlert>,
    pub scraps: Vec<ScrapStat>,
    pub total_scrap_value: f64,
    pub suggestions: Vec<ProductStockStat>,
}

// =============================================================================
// Aggregation
// =============================================================================

#[derive(Default, Clone, Copy)]
struct Velocity {
    quantity: f64,
    revenue: f64,
    margin: f64,
}

/// Folds a product/sales/scrap snapshot into [`StockMetrics`].
///
/// `period_days` is the length of the sales window the lines were fetched
/// for; it scales the weekly-sales velocity. A zero period yields zero
/// velocity rather than dividing by zero.
pub fn compute(
    products: &[Product],
    transactions: &[Transaction],
    lines: &[TransactionLine],
    categories: &[Category],
    period_days: u32,
    scraps: &[ScrapRecord],
    region_filter: Option<Region>,
) -> StockMetrics {
    let catalog = ProductCatalog::build(products, categories);
    let by_transaction = lines_by_transaction(lines);

    // Period sales velocity per product, honoring the region filter.
    let mut velocity: HashMap<i64, Velocity> = HashMap::new();
    for transaction in transactions {
        let store_name = transaction
            .store
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("");
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
            let product_id = line.product.ref_id();
            if product_id == 0 {
                continue;
            }
            let v = velocity.entry(product_id).or_default();
            v.quantity += line.quantity;
            v.revenue += line.subtotal;
            v.margin += line.margin;
        }
    }

    let mut total_valuation = 0.0;
    let mut category_valuation: HashMap<CanonicalCategory, (f64, u32)> = HashMap::new();
    let mut alerts: Vec<StockAlert> = Vec::new();

    let processed: Vec<ProductStockStat> = products
        .iter()
        .map(|product| {
            let sales = velocity.get(&product.id).copied().unwrap_or_default();
            let canonical = catalog.canonical_by_id(product.id);

            let stock = product.on_hand;
            let valuation = if stock > 0.0 {
                stock * product.unit_cost
            } else {
                0.0
            };
            total_valuation += valuation;

            let entry = category_valuation.entry(canonical).or_insert((0.0, 0));
            entry.0 += valuation;
            entry.1 += 1;

            let avg_weekly_sales = if period_days > 0 {
                (sales.quantity / period_days as f64) * 7.0
            } else {
                0.0
            };
            let sku = product.sku_or_empty();
            let is_long_lead = sku.to_uppercase().starts_with(LONG_LEAD_SKU_PREFIX);
            let required_lead_stock = if is_long_lead {
                avg_weekly_sales * LONG_LEAD_WEEKS
            } else {
                avg_weekly_sales * STANDARD_LEAD_WEEKS
            };

            let display_sku = if sku.is_empty() {
                MISSING_SKU_LABEL.to_string()
            } else {
                sku.to_string()
            };
            // Zero forecast falls back to on-hand; a zero from the source
            // usually means the field was never computed.
            let forecasted_stock = if product.forecasted != 0.0 {
                product.forecasted
            } else {
                stock
            };

            if product.is_stockable() {
                if stock <= 0.0 {
                    alerts.push(StockAlert {
                        id: product.id,
                        name: product.name.clone(),
                        sku: display_sku.clone(),
                        status: StockAlertStatus::OutOfStock,
                        current_stock: stock,
                        forecasted_stock,
                        avg_weekly_sales,
                        message: None,
                    });
                } else if stock < required_lead_stock {
                    alerts.push(StockAlert {
                        id: product.id,
                        name: product.name.clone(),
                        sku: display_sku.clone(),
                        status: if is_long_lead {
                            StockAlertStatus::CriticalLead
                        } else {
                            StockAlertStatus::Low
                        },
                        current_stock: stock,
                        forecasted_stock,
                        avg_weekly_sales,
                        message: is_long_lead.then(|| {
                            format!("EG Lead Time (16w req: {required_lead_stock:.1})")
                        }),
                    });
                } else if sales.quantity == 0.0 && period_days >= SLOW_MOVER_MIN_PERIOD_DAYS {
                    alerts.push(StockAlert {
                        id: product.id,
                        name: product.name.clone(),
                        sku: display_sku.clone(),
                        status: StockAlertStatus::SlowMover,
                        current_stock: stock,
                        forecasted_stock,
                        avg_weekly_sales: 0.0,
                        message: None,
                    });
                }
            }

            ProductStockStat {
                id: product.id,
                name: product.name.clone(),
                sku: display_sku,
                quantity: sales.quantity,
                revenue: sales.revenue,
                margin: sales.margin,
                margin_percent: pct(sales.margin, sales.revenue),
                stock_level: stock,
                forecasted_stock,
                kind: product.kind,
            }
        })
        .collect();

    // Write-offs, valued at the current unit cost of the product. Scraps
    // against unknown products get zero value, not an error.
    let mut total_scrap_value = 0.0;
    let scraps: Vec<ScrapStat> = scraps
        .iter()
        .map(|scrap| {
            let cost = catalog
                .product(scrap.product.id)
                .map(|p| p.unit_cost)
                .unwrap_or(0.0);
            let value = scrap.quantity * cost;
            total_scrap_value += value;
            ScrapStat {
                product_id: scrap.product.id,
                name: scrap.product.name.clone(),
                quantity: scrap.quantity,
                value,
                date: scrap.date,
            }
        })
        .collect();

    let top = |key: fn(&ProductStockStat) -> f64| {
        let mut list = processed.clone();
        sort_desc_by(&mut list, key);
        list.truncate(TOP_LIST_LIMIT);
        list
    };
    let top_by_quantity = top(|p| p.quantity);
    let top_by_revenue = top(|p| p.revenue);
    let top_by_margin = top(|p| p.margin);

    let mut valuation_by_category: Vec<StockValue> = category_valuation
        .into_iter()
        .map(|(category, (value, item_count))| StockValue {
            category,
            value,
            item_count,
        })
        .collect();
    sort_desc_by(&mut valuation_by_category, |v| v.value);

    let mut suggestions: Vec<ProductStockStat> = processed
        .into_iter()
        .filter(|p| {
            p.kind == ProductKind::Stockable
                && p.stock_level <= RESTOCK_MAX_STOCK
                && p.revenue > RESTOCK_MIN_REVENUE
        })
        .collect();
    sort_desc_by(&mut suggestions, |p| p.revenue);
    suggestions.truncate(TOP_LIST_LIMIT);

    sort_desc_by(&mut alerts, |a| a.avg_weekly_sales);
    alerts.truncate(MAX_STOCK_ALERTS);

    StockMetrics {
        top_by_quantity,
        top_by_revenue,
        top_by_margin,
        valuation_by_category,
        total_valuation,
        alerts,
        scraps,
        total_scrap_value,
        suggestions,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
