//! Snapshot assembly against the in-memory source: fan-out, record
//! hygiene, the empty-default fallback, and the handoff into the
//! aggregation engine.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use floorboard_core::types::{
    Category, DateRange, Product, ProductKind, Quotation, QuotationLine, QuotationState,
    Reference, ScrapRecord, Store, Transaction, TransactionLine,
};
use floorboard_source::error::{FetchError, FetchResult};
use floorboard_source::{DashboardSnapshot, InMemorySource, RecordSource, SourceConfig};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn window() -> DateRange {
    DateRange::last_days(now(), 30)
}

fn transaction(id: i64, customer: Option<Reference>, company: Option<Reference>) -> Transaction {
    Transaction {
        id,
        name: format!("POS/{id:04}"),
        date: now() - chrono::Duration::days(1),
        amount_total: 100.0,
        margin: 40.0,
        state: "done".into(),
        salesperson: Some(Reference::new(1, "Dana")),
        store: Some(Reference::new(10, "Nottingham")),
        company,
        customer,
        origin_quotation: None,
    }
}

fn line(id: i64, tx: i64) -> TransactionLine {
    TransactionLine {
        id,
        transaction: Reference::new(tx, ""),
        product: Some(Reference::new(1, "Stone Oak")),
        quantity: 1.0,
        unit_price: 100.0,
        subtotal: 100.0,
        discount_percent: 0.0,
        margin: 40.0,
        origin_quotation: None,
    }
}

fn sample_source() -> InMemorySource {
    InMemorySource {
        transactions: vec![
            transaction(1, Some(Reference::new(5, "Jane Doe")), None),
            // Internal transfer, dropped by hygiene.
            transaction(2, Some(Reference::new(6, "Evergreen Floors Ltd")), None),
            // Excluded company, dropped by hygiene.
            transaction(3, None, Some(Reference::new(12, "Holding Co"))),
        ],
        transaction_lines: vec![line(1, 1), line(2, 2), line(3, 3)],
        quotations: vec![Quotation {
            id: 7,
            name: "S00007".into(),
            date: now() - chrono::Duration::days(2),
            amount_total: 240.0,
            amount_untaxed: 200.0,
            state: QuotationState::Sent,
            salesperson: Some(Reference::new(1, "Dana")),
            store: Some(Reference::new(10, "Nottingham")),
            customer: None,
            company: None,
        }],
        quotation_lines: vec![QuotationLine {
            id: 1,
            quotation: Reference::new(7, "S00007"),
            product: Some(Reference::new(1, "Stone Oak")),
            quantity: 2.0,
            unit_price: 100.0,
            subtotal: 200.0,
            discount_percent: 0.0,
        }],
        products: vec![Product {
            id: 1,
            name: "Stone Oak".into(),
            sku: Some("FG-1".into()),
            category: Some(Reference::new(1, "SPC")),
            on_hand: 20.0,
            forecasted: 20.0,
            unit_cost: 8.0,
            sale_price: 20.0,
            kind: ProductKind::Stockable,
        }],
        categories: vec![Category {
            id: 1,
            name: "SPC".into(),
            display_name: "All / SPC Flooring".into(),
            parent: None,
        }],
        scraps: vec![ScrapRecord {
            product: Reference::new(1, "Stone Oak"),
            quantity: 2.0,
            date: now() - chrono::Duration::days(3),
        }],
        stores: vec![Store {
            id: 10,
            name: "Nottingham".into(),
        }],
    }
}

fn hygiene_config() -> SourceConfig {
    let mut config = SourceConfig::default();
    config.query.excluded_companies = vec![12];
    config.query.internal_customers = vec!["Evergreen Floors".into()];
    config
}

#[tokio::test]
async fn snapshot_applies_record_hygiene() {
    let source = sample_source();
    let snapshot = DashboardSnapshot::fetch(&source, &hygiene_config(), window()).await;

    // Two of three transactions are internal and dropped.
    assert_eq!(snapshot.transactions.len(), 1);
    assert_eq!(snapshot.transactions[0].id, 1);
    // Lines follow their surviving parents.
    assert_eq!(snapshot.transaction_lines.len(), 1);
    assert_eq!(snapshot.quotations.len(), 1);
    assert_eq!(snapshot.quotation_lines.len(), 1);
    // The store list is untouched by hygiene rules.
    assert_eq!(snapshot.stores.len(), 1);
    assert_eq!(snapshot.stores[0].name, "Nottingham");
}

#[tokio::test]
async fn snapshot_without_hygiene_rules_keeps_everything() {
    let source = sample_source();
    let snapshot = DashboardSnapshot::fetch(&source, &SourceConfig::default(), window()).await;
    assert_eq!(snapshot.transactions.len(), 3);
    assert_eq!(snapshot.transaction_lines.len(), 3);
}

#[tokio::test]
async fn snapshot_feeds_the_aggregators() {
    let source = sample_source();
    let snapshot = DashboardSnapshot::fetch(&source, &hygiene_config(), window()).await;

    let sales = snapshot.sales_metrics(None);
    assert_eq!(sales.total_sales, 100.0);
    assert_eq!(sales.total_margin, 40.0);

    let stock = snapshot.stock_metrics(30, None);
    assert_eq!(stock.total_valuation, 160.0);
    assert_eq!(stock.total_scrap_value, 16.0);

    let pipeline = snapshot.pipeline_metrics(window(), now(), None, None);
    assert_eq!(pipeline.summary.total_quotes, 1);
    assert_eq!(pipeline.summary.total_value, 200.0);
}

#[tokio::test]
async fn quotations_by_id_indexes_the_snapshot() {
    let source = sample_source();
    let snapshot = DashboardSnapshot::fetch(&source, &SourceConfig::default(), window()).await;
    let index = snapshot.quotations_by_id();
    assert!(index.contains_key(&7));
    assert_eq!(index[&7].name, "S00007");
}

// A source whose catalog reads always fail, for exercising the
// empty-default fallback end to end.
struct FlakyCatalog {
    inner: InMemorySource,
}

#[async_trait]
impl RecordSource for FlakyCatalog {
    async fn transactions(&self, window: DateRange) -> FetchResult<Vec<Transaction>> {
        self.inner.transactions(window).await
    }

    async fn transaction_lines(
        &self,
        transaction_ids: &[i64],
    ) -> FetchResult<Vec<TransactionLine>> {
        self.inner.transaction_lines(transaction_ids).await
    }

    async fn quotations(
        &self,
        window: DateRange,
        states: &[QuotationState],
    ) -> FetchResult<Vec<Quotation>> {
        self.inner.quotations(window, states).await
    }

    async fn quotation_lines(&self, quotation_ids: &[i64]) -> FetchResult<Vec<QuotationLine>> {
        self.inner.quotation_lines(quotation_ids).await
    }

    async fn products(&self) -> FetchResult<Vec<Product>> {
        Err(FetchError::Timeout(30))
    }

    async fn categories(&self) -> FetchResult<Vec<Category>> {
        Err(FetchError::QueryFailed {
            record_set: "categories".into(),
            reason: "boom".into(),
        })
    }

    async fn scrap_records(&self, window: DateRange) -> FetchResult<Vec<ScrapRecord>> {
        self.inner.scrap_records(window).await
    }

    async fn stores(&self) -> FetchResult<Vec<Store>> {
        self.inner.stores().await
    }
}

#[tokio::test]
async fn failed_record_set_degrades_to_empty() {
    let source = FlakyCatalog {
        inner: sample_source(),
    };
    let snapshot = DashboardSnapshot::fetch(&source, &SourceConfig::default(), window()).await;

    assert!(snapshot.products.is_empty());
    assert!(snapshot.categories.is_empty());
    assert_eq!(snapshot.transactions.len(), 3);

    // The engine still produces a well-formed document: unknown products
    // classify as Other, money still reconciles.
    let sales = snapshot.sales_metrics(None);
    assert_eq!(sales.total_sales, 300.0);
    assert_eq!(sales.category_breakdown.len(), 1);
    assert_eq!(
        sales.category_breakdown[0].category,
        floorboard_core::CanonicalCategory::Other
    );
}
