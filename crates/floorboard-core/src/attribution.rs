//! # Salesperson Attribution
//!
//! Resolves which salesperson gets credit for a transaction.
//!
//! A sale is often opened as a quotation by one salesperson and later
//! rung through the till by a different operator. The till records the
//! operator; the quotation records the author. Credit goes to the
//! author: the first line carrying an originating-quotation reference
//! that resolves to a known quotation with a salesperson overrides the
//! transaction's own salesperson.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Quotation, ReferenceExt, Transaction, TransactionLine};

/// Label substituted when attribution yields no usable name.
pub const DEFAULT_SALESPERSON_LABEL: &str = "Employee";

/// Placeholder name some source records carry instead of a real one.
const UNKNOWN_NAME_PLACEHOLDER: &str = "Unknown";

/// The salesperson credited with a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Attribution {
    pub id: i64,
    pub name: String,
}

/// Resolves the credited salesperson for a transaction.
///
/// Defaults to the transaction's own salesperson reference. Lines are
/// scanned in order; the first line whose originating quotation exists
/// in `quotations_by_id` and carries a salesperson overrides both id and
/// name, and the scan stops (first match wins, not last). A missing or
/// `"Unknown"` name resolves to [`DEFAULT_SALESPERSON_LABEL`].
///
/// A dangling originating-quotation reference is not an error: it simply
/// falls through to the transaction's own salesperson.
pub fn resolve(
    transaction: &Transaction,
    lines: &[&TransactionLine],
    quotations_by_id: &HashMap<i64, &Quotation>,
) -> Attribution {
    let mut id = transaction.salesperson.ref_id();
    let mut name = transaction
        .salesperson
        .as_ref()
        .map(|r| r.name.clone())
        .unwrap_or_else(|| DEFAULT_SALESPERSON_LABEL.to_string());

    for line in lines {
        if let Some(origin) = &line.origin_quotation {
            if let Some(quotation) = quotations_by_id.get(&origin.id) {
                if let Some(author) = &quotation.salesperson {
                    id = author.id;
                    name = author.name.clone();
                    break;
                }
            }
        }
    }

    if name.is_empty() || name == UNKNOWN_NAME_PLACEHOLDER {
        name = DEFAULT_SALESPERSON_LABEL.to_string();
    }

    Attribution { id, name }
}

// =============================================================================
// Unit Tests
// =============================================================================
