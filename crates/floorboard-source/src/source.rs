//! # Record Source Boundary
//!
//! The typed surface of the remote line-of-business collaborator. The
//! aggregation engine never talks to the network; it receives a
//! [`DashboardSnapshot`] assembled here.
//!
//! ## Fetch Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Snapshot Assembly                                  │
//! │                                                                         │
//! │  Stage 1 (parallel, independent reads)                                  │
//! │    transactions ─┐                                                      │
//! │    quotations  ──┤                                                      │
//! │    products    ──┼──► join ──► Stage 2 (needs document ids)            │
//! │    categories  ──┤              transaction_lines(ids) ─┐              │
//! │    scraps      ──┤              quotation_lines(ids)  ──┼──► join     │
//! │    stores      ──┘                                                      │
//! │                                                          │              │
//! │  Hygiene filter (config-driven) ◄────────────────────────┘              │
//! │    drop internal-customer and excluded-company documents               │
//! │                                                                         │
//! │  Each failed record set falls back to empty (`or_empty`, logged),      │
//! │  and every aggregator tolerates empty collections.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use floorboard_core::pipeline::{self, PipelineMetrics};
use floorboard_core::region::Region;
use floorboard_core::sales::{self, DashboardMetrics};
use floorboard_core::stock::{self, StockMetrics};
use floorboard_core::types::{
    Category, DateRange, Product, Quotation, QuotationLine, QuotationState, ScrapRecord, Store,
    Transaction, TransactionLine,
};

use crate::config::SourceConfig;
use crate::error::FetchResult;

// =============================================================================
// Record Source Trait
// =============================================================================

/// Read-only access to the remote record sets.
///
/// Implementations own transport, authentication, retry, and the remote
/// query language. Every method is an independent read; callers may
/// issue them with unbounded fan-out.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Completed point-of-sale orders in the window.
    async fn transactions(&self, window: DateRange) -> FetchResult<Vec<Transaction>>;

    /// Lines belonging to the given transactions.
    async fn transaction_lines(&self, transaction_ids: &[i64])
        -> FetchResult<Vec<TransactionLine>>;

    /// Quotations in the window, limited to the given lifecycle states.
    async fn quotations(
        &self,
        window: DateRange,
        states: &[QuotationState],
    ) -> FetchResult<Vec<Quotation>>;

    /// Lines belonging to the given quotations.
    async fn quotation_lines(&self, quotation_ids: &[i64]) -> FetchResult<Vec<QuotationLine>>;

    /// The full product catalog.
    async fn products(&self) -> FetchResult<Vec<Product>>;

    /// The full category tree.
    async fn categories(&self) -> FetchResult<Vec<Category>>;

    /// Stock write-offs in the window.
    async fn scrap_records(&self, window: DateRange) -> FetchResult<Vec<ScrapRecord>>;

    /// The store list.
    async fn stores(&self) -> FetchResult<Vec<Store>>;
}

/// The documented empty-default fallback: a failed fetch of one record
/// set degrades that slice of the dashboard to empty instead of failing
/// the whole snapshot. The failure is logged, never swallowed silently.
pub fn or_empty<T>(result: FetchResult<Vec<T>>, record_set: &str) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(error) => {
            warn!(record_set, %error, "Fetch failed, continuing with empty record set");
            Vec::new()
        }
    }
}

// =============================================================================
// Dashboard Snapshot
// =============================================================================

/// All quotation states the dashboards care about: the active pipeline
/// plus won orders (needed for conversion and attribution).
const SNAPSHOT_QUOTATION_STATES: [QuotationState; 4] = [
    QuotationState::Draft,
    QuotationState::Sent,
    QuotationState::Sale,
    QuotationState::Done,
];

/// One consistent set of record snapshots, ready for aggregation.
#[derive(Debug, Default)]
pub struct DashboardSnapshot {
    pub transactions: Vec<Transaction>,
    pub transaction_lines: Vec<TransactionLine>,
    pub quotations: Vec<Quotation>,
    pub quotation_lines: Vec<QuotationLine>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub scraps: Vec<ScrapRecord>,
    /// Store list for the dashboard filter controls.
    pub stores: Vec<Store>,
}

impl DashboardSnapshot {
    /// Fetches every record set the aggregators need.
    ///
    /// Independent reads run concurrently; line fetches wait for their
    /// parent documents' ids. Documents matching the config's internal
    /// customer or excluded-company rules are dropped here so no
    /// aggregator ever sees them.
    pub async fn fetch<S: RecordSource + ?Sized>(
        source: &S,
        config: &SourceConfig,
        window: DateRange,
    ) -> Self {
        let (transactions, quotations, products, categories, scraps, stores) = tokio::join!(
            source.transactions(window),
            source.quotations(window, &SNAPSHOT_QUOTATION_STATES),
            source.products(),
            source.categories(),
            source.scrap_records(window),
            source.stores(),
        );

        let mut transactions = or_empty(transactions, "transactions");
        let mut quotations = or_empty(quotations, "quotations");
        transactions.retain(|t| keep_document(config, &t.customer, &t.company));
        quotations.retain(|q| keep_document(config, &q.customer, &q.company));

        let transaction_ids: Vec<i64> = transactions.iter().map(|t| t.id).collect();
        let quotation_ids: Vec<i64> = quotations.iter().map(|q| q.id).collect();
        let (transaction_lines, quotation_lines) = tokio::join!(
            source.transaction_lines(&transaction_ids),
            source.quotation_lines(&quotation_ids),
        );

        DashboardSnapshot {
            transactions,
            transaction_lines: or_empty(transaction_lines, "transaction_lines"),
            quotations,
            quotation_lines: or_empty(quotation_lines, "quotation_lines"),
            products: or_empty(products, "products"),
            categories: or_empty(categories, "categories"),
            scraps: or_empty(scraps, "scraps"),
            stores: or_empty(stores, "stores"),
        }
    }

    /// Quotation index used by salesperson attribution.
    pub fn quotations_by_id(&self) -> HashMap<i64, &Quotation> {
        self.quotations.iter().map(|q| (q.id, q)).collect()
    }

    // =========================================================================
    // Aggregation Entry Points
    // =========================================================================

    /// Folds the snapshot into the sales metrics document.
    pub fn sales_metrics(&self, region_filter: Option<Region>) -> DashboardMetrics {
        sales::compute(
            &self.transactions,
            &self.transaction_lines,
            &self.categories,
            &self.products,
            &self.quotations_by_id(),
            region_filter,
        )
    }

    /// Folds the snapshot into the inventory metrics document.
    pub fn stock_metrics(&self, period_days: u32, region_filter: Option<Region>) -> StockMetrics {
        stock::compute(
            &self.products,
            &self.transactions,
            &self.transaction_lines,
            &self.categories,
            period_days,
            &self.scraps,
            region_filter,
        )
    }

    /// Folds the snapshot into the pipeline metrics document.
    pub fn pipeline_metrics(
        &self,
        window: DateRange,
        now: chrono::DateTime<chrono::Utc>,
        region_filter: Option<Region>,
        store_filter: Option<i64>,
    ) -> PipelineMetrics {
        pipeline::compute(
            &self.quotations,
            &self.quotation_lines,
            &self.categories,
            &self.products,
            window,
            now,
            region_filter,
            store_filter,
        )
    }
}

fn keep_document(
    config: &SourceConfig,
    customer: &Option<floorboard_core::types::Reference>,
    company: &Option<floorboard_core::types::Reference>,
) -> bool {
    if let Some(company) = company {
        if config.is_excluded_company(company.id) {
            return false;
        }
    }
    if let Some(customer) = customer {
        if config.is_internal_customer(&customer.name) {
            return false;
        }
    }
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[test]
    fn test_or_empty_falls_back() {
        let ok: FetchResult<Vec<i64>> = Ok(vec![1, 2]);
        assert_eq!(or_empty(ok, "test"), vec![1, 2]);

        let err: FetchResult<Vec<i64>> = Err(FetchError::Timeout(30));
        assert!(or_empty(err, "test").is_empty());
    }
}
