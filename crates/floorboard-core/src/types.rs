//! # Record Schemas
//!
//! Closed, versioned schemas for every record set the engine consumes.
//! Records are immutable snapshots fetched per computation; the engine
//! never owns or mutates them.
//!
//! ## Record Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Record Sets                                     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Transaction    │   │   Quotation     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  gross total    │   │  untaxed value  │   │  sku / kind     │       │
//! │  │  net margin     │   │  lifecycle state│   │  on hand / cost │       │
//! │  │  store / seller │   │  seller / store │   │  category ref   │       │
//! │  └───────┬─────────┘   └───────┬─────────┘   └─────────────────┘       │
//! │          │ 1:n                 │ 1:n                                    │
//! │  ┌───────┴─────────┐   ┌───────┴─────────┐   ┌─────────────────┐       │
//! │  │ TransactionLine │   │ QuotationLine   │   │  ScrapRecord    │       │
//! │  │  tax-exclusive  │   │  tax-exclusive  │   │  write-offs     │       │
//! │  │  subtotal       │   │  subtotal       │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Foreign-Key Convention
//! Every foreign key is an `Option<Reference>`: either a concrete
//! `{id, name}` pair or an explicit absent marker. Absence is a distinct,
//! representable state — never an implicit null or a sentinel tuple.
//! Line subtotals are always tax-exclusive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Reference
// =============================================================================

/// A foreign-key reference carrying the remote id and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reference {
    pub id: i64,
    pub name: String,
}

impl Reference {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Reference {
            id,
            name: name.into(),
        }
    }
}

/// Lookup helpers for optional references.
///
/// Aggregation treats an absent reference as id `0` and an empty display
/// name; both fall through to the "Other"/default buckets downstream.
pub trait ReferenceExt {
    fn ref_id(&self) -> i64;
    fn ref_name(&self) -> &str;
}

impl ReferenceExt for Option<Reference> {
    #[inline]
    fn ref_id(&self) -> i64 {
        self.as_ref().map(|r| r.id).unwrap_or(0)
    }

    #[inline]
    fn ref_name(&self) -> &str {
        self.as_ref().map(|r| r.name.as_str()).unwrap_or("")
    }
}

// =============================================================================
// Transactions (point of sale)
// =============================================================================

/// A completed point-of-sale order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    /// Human-readable order reference shown on receipts.
    pub name: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// Gross total including tax. Negative for refunds.
    pub amount_total: f64,
    /// Net margin reported by the source at order level.
    pub margin: f64,
    /// Lifecycle state as reported by the source (e.g. "done", "paid").
    pub state: String,
    pub salesperson: Option<Reference>,
    pub store: Option<Reference>,
    pub company: Option<Reference>,
    pub customer: Option<Reference>,
    /// The quotation this order was rung through from, if any.
    pub origin_quotation: Option<Reference>,
}

impl Transaction {
    /// A refund is any transaction with a negative gross total.
    #[inline]
    pub fn is_refund(&self) -> bool {
        self.amount_total < 0.0
    }
}

/// A line item on a point-of-sale order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionLine {
    pub id: i64,
    /// Parent transaction. Always present on the wire.
    pub transaction: Reference,
    pub product: Option<Reference>,
    pub quantity: f64,
    pub unit_price: f64,
    /// Tax-exclusive line subtotal.
    pub subtotal: f64,
    /// Discount as a percentage (0-100).
    pub discount_percent: f64,
    pub margin: f64,
    /// The quotation this line originated from, if the sale started life
    /// as a quotation written by another salesperson.
    pub origin_quotation: Option<Reference>,
}

impl TransactionLine {
    /// Monetary discount granted on this line.
    #[inline]
    pub fn discount_amount(&self) -> f64 {
        self.unit_price * self.quantity * self.discount_percent / 100.0
    }
}

// =============================================================================
// Quotations (sale orders)
// =============================================================================

/// Lifecycle state of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum QuotationState {
    /// Being drafted; counts toward the pipeline.
    Draft,
    /// Sent to the customer; counts toward the pipeline.
    Sent,
    /// Confirmed as a sale (won).
    Sale,
    /// Fully delivered and invoiced (won).
    Done,
    /// Lost or cancelled.
    Cancel,
}

impl QuotationState {
    /// Active pipeline states (draft or sent).
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, QuotationState::Draft | QuotationState::Sent)
    }

    /// Won states (confirmed sale or done).
    #[inline]
    pub fn is_won(&self) -> bool {
        matches!(self, QuotationState::Sale | QuotationState::Done)
    }
}

/// A sale order in the quotation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Quotation {
    pub id: i64,
    pub name: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// Gross total including tax.
    pub amount_total: f64,
    /// Tax-exclusive total; all pipeline value metrics use this.
    pub amount_untaxed: f64,
    pub state: QuotationState,
    pub salesperson: Option<Reference>,
    /// The sales team, which approximates the store for quotations.
    pub store: Option<Reference>,
    pub customer: Option<Reference>,
    pub company: Option<Reference>,
}

/// A line item on a quotation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuotationLine {
    pub id: i64,
    pub quotation: Reference,
    pub product: Option<Reference>,
    pub quantity: f64,
    pub unit_price: f64,
    /// Tax-exclusive line subtotal.
    pub subtotal: f64,
    pub discount_percent: f64,
}

// =============================================================================
// Catalog records
// =============================================================================

/// Whether a product holds physical stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ProductKind {
    /// Physical goods; subject to stock alerts and valuation.
    Stockable,
    /// Fitting, delivery and similar services; exempt from stock alerts.
    Service,
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// SKU code; absent for ad-hoc catalog entries.
    pub sku: Option<String>,
    pub category: Option<Reference>,
    /// Units physically on hand. Can go negative on overselling.
    pub on_hand: f64,
    /// Forecasted quantity (on hand plus incoming minus outgoing).
    pub forecasted: f64,
    pub unit_cost: f64,
    pub sale_price: f64,
    pub kind: ProductKind,
}

impl Product {
    #[inline]
    pub fn sku_or_empty(&self) -> &str {
        self.sku.as_deref().unwrap_or("")
    }

    #[inline]
    pub fn is_stockable(&self) -> bool {
        self.kind == ProductKind::Stockable
    }
}

/// A raw catalog category as maintained in the remote source.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Full hierarchical name ("All / Flooring / SPC Herringbone").
    pub display_name: String,
    pub parent: Option<Reference>,
}

impl Category {
    /// The name classification runs against: the hierarchical display
    /// name when present, otherwise the short name.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// A stock write-off.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ScrapRecord {
    pub product: Reference,
    pub quantity: f64,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

/// A retail store (point-of-sale configuration).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Store {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive date window for a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        DateRange { from, to }
    }

    /// The trailing window of `days` days ending at `now`.
    pub fn last_days(now: DateTime<Utc>, days: i64) -> Self {
        DateRange {
            from: now - chrono::Duration::days(days),
            to: now,
        }
    }

    #[inline]
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        date >= self.from && date <= self.to
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reference_ext_absent_defaults() {
        let absent: Option<Reference> = None;
        assert_eq!(absent.ref_id(), 0);
        assert_eq!(absent.ref_name(), "");

        let present = Some(Reference::new(7, "Nottingham"));
        assert_eq!(present.ref_id(), 7);
        assert_eq!(present.ref_name(), "Nottingham");
    }

    #[test]
    fn test_quotation_state_partitions() {
        assert!(QuotationState::Draft.is_active());
        assert!(QuotationState::Sent.is_active());
        assert!(!QuotationState::Sale.is_active());

        assert!(QuotationState::Sale.is_won());
        assert!(QuotationState::Done.is_won());
        assert!(!QuotationState::Cancel.is_won());
        assert!(!QuotationState::Cancel.is_active());
    }

    #[test]
    fn test_discount_amount() {
        let line = TransactionLine {
            id: 1,
            transaction: Reference::new(1, "POS/0001"),
            product: None,
            quantity: 4.0,
            unit_price: 25.0,
            subtotal: 90.0,
            discount_percent: 10.0,
            margin: 30.0,
            origin_quotation: None,
        };
        // 25 x 4 x 10% = 10
        assert!((line.discount_amount() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_date_range_inclusive() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let range = DateRange::new(from, to);

        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(to + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_category_label_falls_back_to_name() {
        let cat = Category {
            id: 1,
            name: "Carpet".into(),
            display_name: String::new(),
            parent: None,
        };
        assert_eq!(cat.label(), "Carpet");

        let cat = Category {
            display_name: "All / Flooring / Carpet".into(),
            ..cat
        };
        assert_eq!(cat.label(), "All / Flooring / Carpet");
    }
}
