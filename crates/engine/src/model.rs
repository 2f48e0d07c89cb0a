use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

// ---------------------------------------------------------------------------
// Pair labels
// ---------------------------------------------------------------------------

/// Wire names of the two sources in a comparison, in report order.
///
/// Fixed per operation: downstream consumers key on these provider
/// codenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairLabels {
    pub first: &'static str,
    pub second: &'static str,
}

pub const LATIN_CUSTODIAN: PairLabels = PairLabels { first: "latin", second: "argentina" };
pub const CUSTODIAN_BROKERAGE: PairLabels = PairLabels { first: "condor", second: "ibkr" };
pub const TRANSFER_CONTROL: PairLabels = PairLabels { first: "transfer", second: "control" };

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Quantities for one symbol in the two compared sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discrepancy {
    pub first: f64,
    pub second: f64,
    pub delta: f64,
}

/// Per-symbol discrepancies between two sources.
///
/// A symbol the comparison visited can end up in exactly one of three
/// states: an entry (quantities differed), in `skipped` (a quantity failed
/// numeric coercion), or absent (quantities agreed, or the symbol fell
/// outside the comparison's key policy).
#[derive(Debug, Clone)]
pub struct DiscrepancyReport {
    pub labels: PairLabels,
    pub entries: BTreeMap<String, Discrepancy>,
    pub skipped: Vec<String>,
}

impl DiscrepancyReport {
    pub fn new(labels: PairLabels) -> Self {
        Self {
            labels,
            entries: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Record a compared pair. Zero deltas are dropped.
    pub(crate) fn record(&mut self, symbol: &str, first: f64, second: f64, delta: f64) {
        if delta != 0.0 {
            self.entries.insert(symbol.to_string(), Discrepancy { first, second, delta });
        }
    }

    pub(crate) fn skip(&mut self, symbol: &str) {
        self.skipped.push(symbol.to_string());
    }

    /// True when the two sources agreed on every compared symbol.
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Wire serialization
// ---------------------------------------------------------------------------

// The wire shape is the upstream contract:
//   { "<SYM>": { "Qty-<first>": q1, "Qty-<second>": q2, "Qty-diferencias": d } }
// with whole quantities emitted as JSON integers.

struct Qty(f64);

impl Serialize for Qty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

struct EntryWire {
    labels: PairLabels,
    entry: Discrepancy,
}

impl Serialize for EntryWire {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(&format!("Qty-{}", self.labels.first), &Qty(self.entry.first))?;
        map.serialize_entry(&format!("Qty-{}", self.labels.second), &Qty(self.entry.second))?;
        map.serialize_entry("Qty-diferencias", &Qty(self.entry.delta))?;
        map.end()
    }
}

impl Serialize for DiscrepancyReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, entry) in &self.entries {
            map.serialize_entry(symbol, &EntryWire { labels: self.labels, entry: *entry })?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_deltas_are_dropped() {
        let mut report = DiscrepancyReport::new(LATIN_CUSTODIAN);
        report.record("AAA", 10.0, 10.0, 0.0);
        report.record("BBB", 10.0, 12.0, 2.0);
        assert_eq!(report.len(), 1);
        assert!(report.entries.contains_key("BBB"));
    }

    #[test]
    fn wire_shape_uses_pair_labels() {
        let mut report = DiscrepancyReport::new(CUSTODIAN_BROKERAGE);
        report.record("ACME INC", 130.0, 100.0, 30.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ACME INC": {
                    "Qty-condor": 130,
                    "Qty-ibkr": 100,
                    "Qty-diferencias": 30,
                }
            })
        );
    }

    #[test]
    fn whole_quantities_serialize_as_integers() {
        let mut report = DiscrepancyReport::new(TRANSFER_CONTROL);
        report.record("XYZ", 5.0, 7.5, -2.5);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"Qty-transfer\":5"), "{json}");
        assert!(json.contains("\"Qty-control\":7.5"), "{json}");
        assert!(json.contains("\"Qty-diferencias\":-2.5"), "{json}");
    }
}
