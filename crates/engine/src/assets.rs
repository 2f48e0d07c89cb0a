// Clause grammar for multi-asset transfer lines.
//
// A transfer row's free-text Assets cell holds zero or more clauses like
// "1234.0000 units of Acme Inc, Stock Symbol ACME". Each clause is a
// decimal quantity followed (non-greedily) by a "Stock Symbol" marker and
// the symbol token, so one cell can expand into several positions.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::AggregatePolicy;

/// One parsed clause. Quantities are whole units: the decimal in the text
/// is parsed as a float and truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetClause {
    pub symbol: String,
    pub quantity: i64,
}

fn clause_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+\.\d+).*?Stock Symbol (\w+)").expect("clause pattern is valid")
    })
}

/// Extract every clause from one cell's text, in order of appearance.
pub fn clauses(text: &str) -> Vec<AssetClause> {
    clause_regex()
        .captures_iter(text)
        .filter_map(|cap| {
            let quantity: f64 = cap[1].parse().ok()?;
            Some(AssetClause {
                symbol: cap[2].to_string(),
                quantity: quantity as i64,
            })
        })
        .collect()
}

/// Fold clauses into a symbol → quantity mapping under the given policy.
pub fn aggregate(
    clauses: impl IntoIterator<Item = AssetClause>,
    policy: AggregatePolicy,
) -> BTreeMap<String, i64> {
    let mut out = BTreeMap::new();
    for clause in clauses {
        match policy {
            AggregatePolicy::LastWriteWins => {
                out.insert(clause.symbol, clause.quantity);
            }
            AggregatePolicy::Sum => {
                *out.entry(clause.symbol).or_insert(0) += clause.quantity;
            }
        }
    }
    out
}
