//! End-to-end folds over a small but realistic snapshot, plus wire-format
//! checks on the serialized metrics documents.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use floorboard_core::pipeline::{self, DrilldownDimension};
use floorboard_core::region::Region;
use floorboard_core::sales;
use floorboard_core::stock::{self, StockAlertStatus};
use floorboard_core::taxonomy::CanonicalCategory;
use floorboard_core::types::{
    Category, DateRange, Product, ProductKind, Quotation, QuotationState, Reference, Transaction,
    TransactionLine,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: 1,
            name: "SPC".into(),
            display_name: "All / SPC Flooring".into(),
            parent: None,
        },
        Category {
            id: 2,
            name: "Laminate".into(),
            display_name: "All / Laminate".into(),
            parent: None,
        },
    ]
}

fn products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Stone Oak SPC".into(),
            sku: Some("FG-100".into()),
            category: Some(Reference::new(1, "SPC")),
            on_hand: 40.0,
            forecasted: 55.0,
            unit_cost: 8.0,
            sale_price: 20.0,
            kind: ProductKind::Stockable,
        },
        Product {
            id: 2,
            name: "Classic Laminate".into(),
            sku: Some("LAM-200".into()),
            category: Some(Reference::new(2, "Laminate")),
            on_hand: 0.0,
            forecasted: 0.0,
            unit_cost: 5.0,
            sale_price: 12.0,
            kind: ProductKind::Stockable,
        },
        Product {
            id: 3,
            name: "[Sample] Stone Oak".into(),
            sku: Some("[SAMPLE-001]".into()),
            category: Some(Reference::new(1, "SPC")),
            on_hand: 100.0,
            forecasted: 100.0,
            unit_cost: 0.5,
            sale_price: 0.0,
            kind: ProductKind::Stockable,
        },
    ]
}

fn transaction(id: i64, total: f64, store: &str) -> Transaction {
    Transaction {
        id,
        name: format!("POS/{id:04}"),
        date: now() - chrono::Duration::days(id),
        amount_total: total,
        margin: 0.0,
        state: "done".into(),
        salesperson: Some(Reference::new(1, "Dana")),
        store: Some(Reference::new(id * 10, store)),
        company: None,
        customer: None,
        origin_quotation: None,
    }
}

fn line(id: i64, tx: i64, product: i64, qty: f64, subtotal: f64, margin: f64) -> TransactionLine {
    TransactionLine {
        id,
        transaction: Reference::new(tx, ""),
        product: Some(Reference::new(product, "")),
        quantity: qty,
        unit_price: if qty != 0.0 { subtotal / qty } else { 0.0 },
        subtotal,
        discount_percent: 0.0,
        margin,
        origin_quotation: None,
    }
}

// Scenario A: one transaction, one SPC line of 100 at 40 margin.
#[test]
fn single_order_category_breakdown() {
    let transactions = vec![transaction(1, 100.0, "Nottingham")];
    let lines = vec![line(1, 1, 1, 1.0, 100.0, 40.0)];
    let metrics = sales::compute(
        &transactions,
        &lines,
        &categories(),
        &products(),
        &HashMap::new(),
        None,
    );

    assert_eq!(metrics.total_sales, 100.0);
    assert_eq!(metrics.total_margin, 40.0);
    assert_eq!(metrics.category_breakdown.len(), 1);
    let spc = &metrics.category_breakdown[0];
    assert_eq!(spc.category, CanonicalCategory::Spc);
    assert_eq!(spc.sales, 100.0);
    assert_eq!(spc.margin, 40.0);
    assert_eq!(spc.margin_percent, 40.0);
}

// Scenario B: a refund order.
#[test]
fn refund_order_tracked_and_netted() {
    let transactions = vec![transaction(1, -50.0, "Hull")];
    let lines = vec![line(1, 1, 1, -1.0, -50.0, -20.0)];
    let metrics = sales::compute(
        &transactions,
        &lines,
        &categories(),
        &products(),
        &HashMap::new(),
        None,
    );

    assert_eq!(metrics.total_refunds, 50.0);
    assert_eq!(metrics.refund_count, 1);
    assert_eq!(metrics.total_sales, -50.0);
}

// Scenario C: sample units excluded from money, counted as units.
#[test]
fn sample_units_counted_not_valued() {
    let quotations = vec![Quotation {
        id: 1,
        name: "S00001".into(),
        date: now() - chrono::Duration::days(3),
        amount_total: 0.0,
        amount_untaxed: 0.0,
        state: QuotationState::Draft,
        salesperson: None,
        store: None,
        customer: None,
        company: None,
    }];
    let quotation_lines = vec![floorboard_core::types::QuotationLine {
        id: 1,
        quotation: Reference::new(1, "S00001"),
        product: Some(Reference::new(3, "[Sample] Stone Oak")),
        quantity: 3.0,
        unit_price: 0.0,
        subtotal: 0.0,
        discount_percent: 0.0,
    }];

    let metrics = pipeline::compute(
        &quotations,
        &quotation_lines,
        &categories(),
        &products(),
        DateRange::last_days(now(), 90),
        now(),
        None,
        None,
    );

    assert_eq!(metrics.summary.sample_count, 3.0);
    // Sample-only quotation is not pipeline.
    assert_eq!(metrics.summary.total_quotes, 0);
    assert_eq!(metrics.summary.total_value, 0.0);
}

// Scenario D: region resolution and grand-total membership.
#[test]
fn other_region_in_grand_totals_only() {
    let transactions = vec![
        transaction(1, 100.0, "Hedge End 2"),
        transaction(2, 200.0, "Random City"),
    ];
    let lines = vec![line(1, 1, 1, 1.0, 100.0, 50.0), line(2, 2, 1, 2.0, 200.0, 100.0)];
    let metrics = sales::compute(
        &transactions,
        &lines,
        &categories(),
        &products(),
        &HashMap::new(),
        None,
    );

    assert_eq!(metrics.total_sales, 300.0);
    let south = metrics.regional_stats.iter().find(|r| r.name == "South").unwrap();
    assert_eq!(south.total_sales, 100.0);
    let north = metrics.regional_stats.iter().find(|r| r.name == "North").unwrap();
    assert_eq!(north.total_sales, 0.0);

    let stores: Vec<(&str, Region)> = metrics
        .store_stats
        .iter()
        .map(|s| (s.name.as_str(), s.region))
        .collect();
    assert!(stores.contains(&("Hedge End 2", Region::South)));
    assert!(stores.contains(&("Random City", Region::Other)));
}

// Scenario E: zero-line active quotation still counts.
#[test]
fn empty_quotation_is_real_pipeline() {
    let quotations = vec![Quotation {
        id: 1,
        name: "S00001".into(),
        date: now() - chrono::Duration::days(3),
        amount_total: 600.0,
        amount_untaxed: 500.0,
        state: QuotationState::Sent,
        salesperson: Some(Reference::new(1, "Dana")),
        store: Some(Reference::new(10, "Nottingham")),
        customer: None,
        company: None,
    }];

    let metrics = pipeline::compute(
        &quotations,
        &[],
        &categories(),
        &products(),
        DateRange::last_days(now(), 90),
        now(),
        None,
        None,
    );

    assert_eq!(metrics.summary.total_quotes, 1);
    assert_eq!(metrics.summary.total_value, 500.0);
    assert_eq!(metrics.recent_quotes.len(), 1);
}

#[test]
fn stock_alerts_over_snapshot() {
    let transactions = vec![transaction(1, 100.0, "Hull")];
    let lines = vec![line(1, 1, 1, 10.0, 200.0, 80.0)];
    let metrics = stock::compute(
        &products(),
        &transactions,
        &lines,
        &categories(),
        30,
        &[],
        None,
    );

    // Laminate product has zero stock.
    let out = metrics
        .alerts
        .iter()
        .find(|a| a.status == StockAlertStatus::OutOfStock)
        .unwrap();
    assert_eq!(out.id, 2);

    // Valuation: 40 * 8 + 0 + 100 * 0.5.
    assert_eq!(metrics.total_valuation, 370.0);
}

#[test]
fn drilldown_matches_chart_segment() {
    let quotations = vec![
        Quotation {
            id: 1,
            name: "S00001".into(),
            date: now() - chrono::Duration::days(10),
            amount_total: 120.0,
            amount_untaxed: 100.0,
            state: QuotationState::Draft,
            salesperson: Some(Reference::new(1, "Dana")),
            store: Some(Reference::new(10, "Nottingham")),
            customer: None,
            company: None,
        },
        Quotation {
            id: 2,
            name: "S00002".into(),
            date: now() - chrono::Duration::days(10),
            amount_total: 240.0,
            amount_untaxed: 200.0,
            state: QuotationState::Draft,
            salesperson: Some(Reference::new(2, "Alex")),
            store: Some(Reference::new(11, "Swansea")),
            customer: None,
            company: None,
        },
    ];

    let rows = pipeline::drilldown(
        DrilldownDimension::Salesperson,
        "Alex",
        &quotations,
        &[],
        &categories(),
        &products(),
        DateRange::last_days(now(), 90),
        now(),
        None,
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 2);
}

#[test]
fn documents_serialize_camel_case_with_display_labels() {
    let transactions = vec![transaction(1, 100.0, "Nottingham")];
    let lines = vec![line(1, 1, 1, 1.0, 100.0, 40.0)];
    let metrics = sales::compute(
        &transactions,
        &lines,
        &categories(),
        &products(),
        &HashMap::new(),
        None,
    );

    let json = serde_json::to_value(&metrics).unwrap();
    assert!(json.get("totalSales").is_some());
    assert!(json.get("categoryBreakdown").is_some());
    assert!(json.get("lowMarginAlerts").is_some());
    assert_eq!(json["categoryBreakdown"][0]["category"], "SPC");
    // Named regions are emitted North first; Nottingham lands there.
    assert_eq!(json["regionalStats"][0]["totalSales"], 100.0);

    // Category enum round-trips through its display label.
    let label = serde_json::to_string(&CanonicalCategory::LvtLvc).unwrap();
    assert_eq!(label, "\"LVT / LVC\"");
}
