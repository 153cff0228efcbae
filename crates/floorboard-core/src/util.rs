//! # Shared Aggregation Helpers
//!
//! Small numeric and grouping helpers used by every aggregator. Division
//! guards live here so a zero-sales rollup reports `0` percent instead of
//! NaN or infinity.

use std::collections::HashMap;

use crate::types::{QuotationLine, TransactionLine};

/// Percentage of `part` over `whole`, guarded against division by zero.
///
/// Any non-positive `whole` yields `0.0`. Every percentage field in the
/// metrics documents is derived through this helper.
///
/// ## Example
/// ```rust
/// use floorboard_core::util::pct;
///
/// assert_eq!(pct(40.0, 100.0), 40.0);
/// assert_eq!(pct(40.0, 0.0), 0.0);
/// assert_eq!(pct(40.0, -10.0), 0.0);
/// ```
pub fn pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}

/// Groups transaction lines by their parent transaction id.
///
/// Built once per `compute` call; the per-transaction loops look lines up
/// here instead of rescanning the full line set.
pub fn lines_by_transaction(lines: &[TransactionLine]) -> HashMap<i64, Vec<&TransactionLine>> {
    let mut map: HashMap<i64, Vec<&TransactionLine>> = HashMap::new();
    for line in lines {
        map.entry(line.transaction.id).or_default().push(line);
    }
    map
}

/// Groups quotation lines by their parent quotation id.
pub fn lines_by_quotation(lines: &[QuotationLine]) -> HashMap<i64, Vec<&QuotationLine>> {
    let mut map: HashMap<i64, Vec<&QuotationLine>> = HashMap::new();
    for line in lines {
        map.entry(line.quotation.id).or_default().push(line);
    }
    map
}

/// Sorts a slice descending by an `f64` key. NaN keys sort last.
pub fn sort_desc_by<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reference;

    fn line(id: i64, transaction_id: i64) -> TransactionLine {
        TransactionLine {
            id,
            transaction: Reference::new(transaction_id, "POS"),
            product: None,
            quantity: 1.0,
            unit_price: 10.0,
            subtotal: 10.0,
            discount_percent: 0.0,
            margin: 4.0,
            origin_quotation: None,
        }
    }

    #[test]
    fn test_pct_guards_zero_and_negative() {
        assert_eq!(pct(50.0, 200.0), 25.0);
        assert_eq!(pct(50.0, 0.0), 0.0);
        assert_eq!(pct(50.0, -1.0), 0.0);
        assert_eq!(pct(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_lines_by_transaction_preserves_order() {
        let lines = vec![line(1, 7), line(2, 8), line(3, 7)];
        let map = lines_by_transaction(&lines);
        let ids: Vec<i64> = map[&7].iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(map[&8].len(), 1);
    }

    #[test]
    fn test_sort_desc_by() {
        let mut values = vec![1.0_f64, 3.0, 2.0];
        sort_desc_by(&mut values, |v| *v);
        assert_eq!(values, vec![3.0, 2.0, 1.0]);
    }
}
