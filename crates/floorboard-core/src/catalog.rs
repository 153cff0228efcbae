//! # Product Catalog Index
//!
//! Precomputed `id → entity` lookups shared by all aggregators. Built
//! once per `compute` call so the per-line loops never fall back to
//! linear scans over the product or category sets.
//!
//! Classification runs once per product at build time; every line
//! touching the product reuses the cached canonical category.

use std::collections::HashMap;

use crate::taxonomy::{self, CanonicalCategory};
use crate::types::{Category, Product, Reference};

/// Fallback raw category name for products with a missing or dangling
/// category reference. Still fed through the classifier so SKU and name
/// rules apply.
const UNKNOWN_CATEGORY_LABEL: &str = "Other";

/// A product joined with its classification results.
#[derive(Debug)]
pub struct CatalogEntry<'a> {
    pub product: &'a Product,
    pub canonical: CanonicalCategory,
    pub is_sample: bool,
}

/// Indexed view over the product and category record sets.
pub struct ProductCatalog<'a> {
    by_id: HashMap<i64, CatalogEntry<'a>>,
}

impl<'a> ProductCatalog<'a> {
    /// Builds the index, classifying every product exactly once.
    pub fn build(products: &'a [Product], categories: &'a [Category]) -> Self {
        let category_labels: HashMap<i64, &str> =
            categories.iter().map(|c| (c.id, c.label())).collect();

        let by_id = products
            .iter()
            .map(|product| {
                let raw_category = product
                    .category
                    .as_ref()
                    .and_then(|r| category_labels.get(&r.id).copied())
                    .unwrap_or(UNKNOWN_CATEGORY_LABEL);
                let sku = product.sku_or_empty();
                let canonical = taxonomy::classify(raw_category, sku, &product.name);
                let is_sample = taxonomy::is_sample(sku, &product.name);
                (
                    product.id,
                    CatalogEntry {
                        product,
                        canonical,
                        is_sample,
                    },
                )
            })
            .collect();

        ProductCatalog { by_id }
    }

    /// Looks up the entry behind an optional product reference.
    pub fn entry(&self, product: &Option<Reference>) -> Option<&CatalogEntry<'a>> {
        product.as_ref().and_then(|r| self.by_id.get(&r.id))
    }

    /// Looks up a product by id.
    pub fn product(&self, id: i64) -> Option<&'a Product> {
        self.by_id.get(&id).map(|e| e.product)
    }

    /// Canonical category for a product id; unknown ids map to `Other`.
    pub fn canonical_by_id(&self, id: i64) -> CanonicalCategory {
        self.by_id
            .get(&id)
            .map(|e| e.canonical)
            .unwrap_or(CanonicalCategory::Other)
    }

    /// Canonical category for a line's product; unknown products map to
    /// `Other` rather than failing.
    pub fn canonical(&self, product: &Option<Reference>) -> CanonicalCategory {
        self.entry(product)
            .map(|e| e.canonical)
            .unwrap_or(CanonicalCategory::Other)
    }

    /// Whether a line's product is a customer sample. Unknown products
    /// are not samples.
    pub fn is_sample(&self, product: &Option<Reference>) -> bool {
        self.entry(product).map(|e| e.is_sample).unwrap_or(false)
    }
}
