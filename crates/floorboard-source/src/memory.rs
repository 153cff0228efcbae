//! # In-Memory Record Source
//!
//! A [`RecordSource`] backed by vectors, for tests and offline demos. It
//! applies the same window, id, and state filtering a real transport
//! would, so snapshot assembly behaves identically against it.

use async_trait::async_trait;

use floorboard_core::types::{
    Category, DateRange, Product, Quotation, QuotationLine, QuotationState, ScrapRecord, Store,
    Transaction, TransactionLine,
};

use crate::error::FetchResult;
use crate::source::RecordSource;

/// Record sets served straight from memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub transactions: Vec<Transaction>,
    pub transaction_lines: Vec<TransactionLine>,
    pub quotations: Vec<Quotation>,
    pub quotation_lines: Vec<QuotationLine>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub scraps: Vec<ScrapRecord>,
    pub stores: Vec<Store>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn transactions(&self, window: DateRange) -> FetchResult<Vec<Transaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| window.contains(t.date))
            .cloned()
            .collect())
    }

    async fn transaction_lines(
        &self,
        transaction_ids: &[i64],
    ) -> FetchResult<Vec<TransactionLine>> {
        Ok(self
            .transaction_lines
            .iter()
            .filter(|l| transaction_ids.contains(&l.transaction.id))
            .cloned()
            .collect())
    }

    async fn quotations(
        &self,
        window: DateRange,
        states: &[QuotationState],
    ) -> FetchResult<Vec<Quotation>> {
        Ok(self
            .quotations
            .iter()
            .filter(|q| window.contains(q.date) && states.contains(&q.state))
            .cloned()
            .collect())
    }

    async fn quotation_lines(&self, quotation_ids: &[i64]) -> FetchResult<Vec<QuotationLine>> {
        Ok(self
            .quotation_lines
            .iter()
            .filter(|l| quotation_ids.contains(&l.quotation.id))
            .cloned()
            .collect())
    }

    async fn products(&self) -> FetchResult<Vec<Product>> {
        Ok(self.products.clone())
    }

    async fn categories(&self) -> FetchResult<Vec<Category>> {
        Ok(self.categories.clone())
    }

    async fn scrap_records(&self, window: DateRange) -> FetchResult<Vec<ScrapRecord>> {
        Ok(self
            .scraps
            .iter()
            .filter(|s| window.contains(s.date))
            .cloned()
            .collect())
    }

    async fn stores(&self) -> FetchResult<Vec<Store>> {
        Ok(self.stores.clone())
    }
}
