// Per-source extraction: each provider's export becomes a symbol →
// quantity mapping, applying that provider's format contract.

use std::collections::BTreeMap;

use crate::assets;
use crate::config::{CustodianBrokerageLayout, LatinCustodianLayout, RowWindow, TransferLayout};
use crate::error::EngineError;
use crate::normalize;
use crate::table::{Cell, Table, Workbook};

/// Mapping key for a label cell: text as-is, numeric codes via their
/// display form. Blank labels have no key, so their rows drop out.
fn symbol_key(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(_) => Some(cell.to_string()),
    }
}

/// Latin export: label and quantity columns over every row, labels
/// normalized. Quantities stay raw cells; coercion happens at diff time,
/// where a blank counts as zero and anything unparseable skips the symbol.
pub fn latin_positions(table: &Table, layout: &LatinCustodianLayout) -> BTreeMap<String, Cell> {
    let mut out = BTreeMap::new();
    for row in 0..table.row_count() {
        let label = normalize::normalize(table.cell(row, layout.latin_label_col));
        let Some(key) = symbol_key(&label) else { continue };
        out.insert(key, table.cell(row, layout.latin_qty_col).clone());
    }
    out
}

/// Custodian export, raw variant: fixed row window, labels taken verbatim
/// (the custodian already reports bare codes), quantities left as cells.
pub fn custodian_positions(
    table: &Table,
    window: RowWindow,
    label_col: usize,
    qty_col: usize,
) -> BTreeMap<String, Cell> {
    let mut out = BTreeMap::new();
    for row in window.clip(table.row_count()) {
        let Some(key) = symbol_key(table.cell(row, label_col)) else { continue };
        out.insert(key, table.cell(row, qty_col).clone());
    }
    out
}

/// Custodian export, integer variant: every labeled row in the window must
/// carry a numeric quantity (floats truncate). A bad cell here is a broken
/// export, not a skippable symbol.
pub fn custodian_positions_int(
    table: &Table,
    window: RowWindow,
    label_col: usize,
    qty_col: usize,
) -> Result<BTreeMap<String, i64>, EngineError> {
    let mut out = BTreeMap::new();
    for row in window.clip(table.row_count()) {
        let Some(key) = symbol_key(table.cell(row, label_col)) else { continue };
        let qty_cell = table.cell(row, qty_col);
        let qty = qty_cell.as_number().ok_or_else(|| EngineError::QuantityParse {
            source: "custodian",
            label: key.clone(),
            value: qty_cell.to_string(),
        })?;
        out.insert(key, qty as i64);
    }
    Ok(out)
}

/// Brokerage delimited export: disclaimer lines, then a header row naming
/// the instrument and position columns.
pub fn brokerage_positions(
    table: &Table,
    layout: &CustodianBrokerageLayout,
) -> Result<BTreeMap<String, i64>, EngineError> {
    let header_row = layout.brokerage_skip_rows;
    let label_col = table
        .header_position(header_row, &layout.brokerage_label_header)
        .ok_or_else(|| EngineError::MissingColumn {
            source: "brokerage",
            column: layout.brokerage_label_header.clone(),
        })?;
    let qty_col = table
        .header_position(header_row, &layout.brokerage_qty_header)
        .ok_or_else(|| EngineError::MissingColumn {
            source: "brokerage",
            column: layout.brokerage_qty_header.clone(),
        })?;

    let mut out = BTreeMap::new();
    for row in header_row + 1..table.row_count() {
        let Some(key) = symbol_key(table.cell(row, label_col)) else { continue };
        let qty_cell = table.cell(row, qty_col);
        let qty = qty_cell.as_number().ok_or_else(|| EngineError::QuantityParse {
            source: "brokerage",
            label: key.clone(),
            value: qty_cell.to_string(),
        })?;
        out.insert(key, qty as i64);
    }
    Ok(out)
}

/// Transfer sheets: every Assets clause across the configured sheets, in
/// workbook order, folded under the layout's aggregation policy. Absent
/// sheets are simply not there; a workbook with none of them is an error.
pub fn transfer_positions(
    workbook: &Workbook,
    layout: &TransferLayout,
) -> Result<BTreeMap<String, i64>, EngineError> {
    let mut found = 0usize;
    let mut parsed = Vec::new();

    for (name, sheet) in workbook.iter() {
        if !layout.sheets.iter().any(|s| s == name) {
            continue;
        }
        found += 1;
        let assets_col = sheet
            .header_position(0, &layout.assets_header)
            .ok_or_else(|| EngineError::MissingColumn {
                source: "transactions",
                column: layout.assets_header.clone(),
            })?;
        for row in 1..sheet.row_count() {
            if let Some(text) = sheet.cell(row, assets_col).as_text() {
                parsed.extend(assets::clauses(text));
            }
        }
    }

    if found == 0 {
        return Err(EngineError::MissingSheets { expected: layout.sheets.clone() });
    }

    Ok(assets::aggregate(parsed, layout.aggregate))
}

/// Conversions ledger: one control value per NEMO. An ADR-typed row wins
/// over CEDEAR rows regardless of order; the first row of the winning type
/// provides the value. A NEMO with neither type has no control value.
pub fn conversion_controls(
    table: &Table,
    layout: &TransferLayout,
) -> Result<BTreeMap<String, f64>, EngineError> {
    let column = |name: &str| {
        table.header_position(0, name).ok_or_else(|| EngineError::MissingColumn {
            source: "conversions",
            column: name.to_string(),
        })
    };
    let nemo_col = column(&layout.nemo_header)?;
    let type_col = column(&layout.type_header)?;
    let adr_col = column(&layout.adr_qty_header)?;
    let cedear_col = column(&layout.cedear_qty_header)?;

    #[derive(Default)]
    struct Picks {
        adr: Option<f64>,
        cedear: Option<f64>,
    }

    let mut picks: BTreeMap<String, Picks> = BTreeMap::new();
    for row in 1..table.row_count() {
        let Some(nemo) = symbol_key(table.cell(row, nemo_col)) else { continue };
        let entry = picks.entry(nemo).or_default();
        // A missing or non-numeric value still claims the slot, as zero
        match table.cell(row, type_col).as_text() {
            Some("ADR") if entry.adr.is_none() => {
                entry.adr = Some(table.cell(row, adr_col).as_number().unwrap_or(0.0));
            }
            Some("CEDEAR") if entry.cedear.is_none() => {
                entry.cedear = Some(table.cell(row, cedear_col).as_number().unwrap_or(0.0));
            }
            _ => {}
        }
    }

    Ok(picks
        .into_iter()
        .filter_map(|(nemo, p)| p.adr.or(p.cedear).map(|value| (nemo, value)))
        .collect())
}
