// Excel workbook import (xlsx, xls, xlsb, ods) from in-memory bytes.
//
// One-way conversion: sheets become plain cell grids, nothing else from
// the workbook (formats, formulas, merges) survives.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use posrecon_engine::{Cell, Table, Workbook};

/// Maximum number of cells to import (prevents DoS from huge files)
const MAX_CELLS: usize = 5_000_000;

/// Import every sheet of a workbook, preserving sheet order and names.
pub fn import_workbook(bytes: &[u8]) -> Result<Workbook, String> {
    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| format!("failed to open workbook: {e}"))?;

    let sheet_names = source.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("workbook contains no sheets".to_string());
    }

    let mut workbook = Workbook::new();
    let mut total_cells = 0usize;
    for name in &sheet_names {
        let range = source
            .worksheet_range(name)
            .map_err(|e| format!("failed to read sheet '{name}': {e}"))?;
        workbook.push_sheet(name, range_to_table(&range, &mut total_cells)?);
    }
    Ok(workbook)
}

/// Import only the first sheet, for single-table exports.
pub fn import_sheet(bytes: &[u8]) -> Result<Table, String> {
    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| format!("failed to open workbook: {e}"))?;

    let name = source
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "workbook contains no sheets".to_string())?;
    let range = source
        .worksheet_range(&name)
        .map_err(|e| format!("failed to read sheet '{name}': {e}"))?;

    let mut total_cells = 0usize;
    range_to_table(&range, &mut total_cells)
}

fn range_to_table(range: &Range<Data>, total_cells: &mut usize) -> Result<Table, String> {
    let mut table = Table::new();

    // Range start offset: data may not begin at A1, but the fixed row
    // windows in the layouts are absolute, so pad the grid back out.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    for (row_idx, row) in range.rows().enumerate() {
        let target_row = start_row as usize + row_idx;
        for (col_idx, data) in row.iter().enumerate() {
            let cell = convert(data);
            if cell.is_empty() {
                continue;
            }
            *total_cells += 1;
            if *total_cells > MAX_CELLS {
                return Err(format!("workbook too large (over {MAX_CELLS} cells)"));
            }
            table.set(target_row, start_col as usize + col_idx, cell);
        }
    }
    Ok(table)
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Error cells read as their display text; coercion downstream
        // treats them as unparseable
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook as XlsxWorkbook;

    #[test]
    fn import_places_cells_at_absolute_positions() {
        let mut fixture = XlsxWorkbook::new();
        let sheet = fixture.add_worksheet();
        // Nothing above row 10 or left of column B: the range offset
        // must not shift positions
        sheet.write_string(10, 1, "ACME INC").unwrap();
        sheet.write_number(10, 4, 130.0).unwrap();
        let bytes = fixture.save_to_buffer().unwrap();

        let table = import_sheet(&bytes).unwrap();
        assert_eq!(table.cell(10, 1).as_text(), Some("ACME INC"));
        assert_eq!(table.cell(10, 4).as_number(), Some(130.0));
        assert!(table.cell(0, 0).is_empty());
    }

    #[test]
    fn import_workbook_keeps_sheet_names_and_order() {
        let mut fixture = XlsxWorkbook::new();
        let first = fixture.add_worksheet();
        first.set_name("Position Transfer IN").unwrap();
        first.write_string(0, 0, "Assets").unwrap();
        let second = fixture.add_worksheet();
        second.set_name("Summary").unwrap();
        second.write_string(0, 0, "ignored").unwrap();
        let bytes = fixture.save_to_buffer().unwrap();

        let workbook = import_workbook(&bytes).unwrap();
        assert_eq!(workbook.sheet_count(), 2);
        let names: Vec<&str> = workbook.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Position Transfer IN", "Summary"]);
        assert!(workbook.sheet("Position Transfer IN").is_some());
    }

    #[test]
    fn numbers_stay_numeric_and_strings_stay_text() {
        let mut fixture = XlsxWorkbook::new();
        let sheet = fixture.add_worksheet();
        sheet.write_string(0, 0, "GGAL").unwrap();
        sheet.write_number(0, 1, 1250.5).unwrap();
        let bytes = fixture.save_to_buffer().unwrap();

        let table = import_sheet(&bytes).unwrap();
        assert_eq!(table.cell(0, 0), &Cell::Text("GGAL".into()));
        assert_eq!(table.cell(0, 1), &Cell::Number(1250.5));
    }

    #[test]
    fn garbage_bytes_fail_with_a_message() {
        let err = import_sheet(b"not a workbook").unwrap_err();
        assert!(err.contains("failed to open workbook"), "{err}");
    }
}
