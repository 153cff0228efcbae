//! # floorboard-core: Pure Metrics Engine for Floorboard
//!
//! This crate is the **heart** of Floorboard. It folds flat retail
//! record snapshots into the dashboard metrics documents, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Floorboard Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Dashboards (consumers)                         │   │
//! │  │   Sales view ──► Stock view ──► Pipeline view ──► Drilldowns   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ metrics documents (JSON)               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ floorboard-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌─────────────────┐  │   │
//! │  │   │ taxonomy │ │  region  │ │attribution│ │  sales / stock  │  │   │
//! │  │   │ classify │ │ resolve  │ │  resolve  │ │   / pipeline    │  │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └─────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────▲───────────────────────────────────┘   │
//! │                                │ record snapshots                       │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │              floorboard-source (collaborator boundary)          │   │
//! │  │        RecordSource trait, snapshot fan-out, fetch fallback     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Record schemas (Transaction, Quotation, Product, etc.)
//! - [`taxonomy`] - Canonical category classification
//! - [`region`] - Store name to region resolution
//! - [`attribution`] - Salesperson attribution with quotation override
//! - [`catalog`] - Precomputed product/category indices
//! - [`sales`] - Sales metrics ([`sales::DashboardMetrics`])
//! - [`stock`] - Inventory metrics ([`stock::StockMetrics`])
//! - [`pipeline`] - Quotation pipeline metrics ([`pipeline::PipelineMetrics`])
//! - [`util`] - Guarded percentages and grouping helpers
//! - [`error`] - Engine error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every fold is deterministic - same snapshot = same document
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Total Classification**: Every input maps to a canonical value; defaults, not panics
//! 4. **Guarded Math**: Division by zero coerces to 0, never NaN in a document
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use floorboard_core::sales;
//!
//! // An empty snapshot still folds to a well-formed, zeroed document.
//! let metrics = sales::compute(&[], &[], &[], &[], &HashMap::new(), None);
//! assert_eq!(metrics.total_sales, 0.0);
//! assert_eq!(metrics.total_margin_percent, 0.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod attribution;
pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod region;
pub mod sales;
pub mod stock;
pub mod taxonomy;
pub mod types;
pub mod util;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use floorboard_core::Region` instead of
// `use floorboard_core::region::Region`

pub use error::{CoreError, CoreResult};
pub use region::Region;
pub use taxonomy::CanonicalCategory;
pub use types::*;
