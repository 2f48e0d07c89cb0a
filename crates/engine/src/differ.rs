// The three pairwise reconciliation operations. Each is a pure single
// pass: extract both sources, compare under the operation's key policy,
// keep the non-zero deltas.

use std::collections::BTreeSet;

use crate::config::{CustodianBrokerageLayout, LatinCustodianLayout, TransferLayout};
use crate::error::EngineError;
use crate::extract;
use crate::model::{DiscrepancyReport, CUSTODIAN_BROKERAGE, LATIN_CUSTODIAN, TRANSFER_CONTROL};
use crate::table::{Table, Workbook};

/// Latin export vs custodian export.
///
/// Anchored on the Latin side: only symbols the Latin export reports are
/// compared, and only when the custodian window also has them. A blank
/// Latin quantity counts as zero; a quantity that fails coercion on either
/// side skips that symbol (recorded in the report's skip list). Delta is
/// custodian minus Latin.
pub fn diff_latin_custodian(
    latin: &Table,
    custodian: &Table,
    layout: &LatinCustodianLayout,
) -> DiscrepancyReport {
    let latin_positions = extract::latin_positions(latin, layout);
    let custodian_positions = extract::custodian_positions(
        custodian,
        layout.custodian_window,
        layout.custodian_label_col,
        layout.custodian_qty_col,
    );

    let mut report = DiscrepancyReport::new(LATIN_CUSTODIAN);
    for (symbol, latin_qty) in &latin_positions {
        let Some(custodian_qty) = custodian_positions.get(symbol) else { continue };

        let latin_value = if latin_qty.is_empty() { Some(0.0) } else { latin_qty.as_number() };
        match (latin_value, custodian_qty.as_number()) {
            (Some(a), Some(b)) => report.record(symbol, a, b, b - a),
            _ => report.skip(symbol),
        }
    }
    report
}

/// Custodian export vs brokerage export.
///
/// Anchored on the custodian side: every symbol in the custodian window
/// that the brokerage also reports, integer quantities, delta custodian
/// minus brokerage.
pub fn diff_custodian_brokerage(
    brokerage: &Table,
    custodian: &Table,
    layout: &CustodianBrokerageLayout,
) -> Result<DiscrepancyReport, EngineError> {
    let brokerage_positions = extract::brokerage_positions(brokerage, layout)?;
    let custodian_positions = extract::custodian_positions_int(
        custodian,
        layout.custodian_window,
        layout.custodian_label_col,
        layout.custodian_qty_col,
    )?;

    let mut report = DiscrepancyReport::new(CUSTODIAN_BROKERAGE);
    for (symbol, &custodian_qty) in &custodian_positions {
        let Some(&brokerage_qty) = brokerage_positions.get(symbol) else { continue };
        let delta = custodian_qty - brokerage_qty;
        report.record(symbol, custodian_qty as f64, brokerage_qty as f64, delta as f64);
    }
    Ok(report)
}

/// Transfer sheets vs conversions ledger.
///
/// Symmetric, unlike the other two: the union of both key sets is
/// compared, a missing side counting as zero. Delta is transfer minus
/// control.
pub fn diff_transfers_conversions(
    transactions: &Workbook,
    conversions: &Table,
    layout: &TransferLayout,
) -> Result<DiscrepancyReport, EngineError> {
    let transfer = extract::transfer_positions(transactions, layout)?;
    let control = extract::conversion_controls(conversions, layout)?;

    let mut report = DiscrepancyReport::new(TRANSFER_CONTROL);
    let symbols: BTreeSet<&String> = transfer.keys().chain(control.keys()).collect();
    for symbol in symbols {
        let t = transfer.get(symbol).copied().unwrap_or(0) as f64;
        let c = control.get(symbol).copied().unwrap_or(0.0);
        report.record(symbol, t, c, t - c);
    }
    Ok(report)
}
