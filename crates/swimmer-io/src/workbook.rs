use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use log::{debug, warn};
use swimmer_core::SourceTables;
use swimmer_table::{Table, Value};

use crate::{Error, Result, DATA_SHEET, REQUIRED_SHEETS, SETTINGS_SHEET, STYLES_SHEET};

/// Header given to a blank header cell; repeats get `_1`, `_2`, ... appended.
const EMPTY_HEADER: &str = "__EMPTY";

/// Read a workbook from disk (`.xlsx`, `.xlsm`, `.xls`, `.xlsb` or `.ods`).
pub fn read_workbook_path(path: impl AsRef<Path>) -> Result<SourceTables> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    debug!("opened workbook {}", path.display());
    read_sheets(&mut workbook)
}

/// Read a workbook held in memory; the container format is sniffed from the bytes.
pub fn read_workbook_bytes(bytes: impl Into<Vec<u8>>) -> Result<SourceTables> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.into()))?;
    read_sheets(&mut workbook)
}

fn read_sheets<RS>(workbook: &mut Sheets<RS>) -> Result<SourceTables>
where
    RS: Read + Seek,
{
    let names = workbook.sheet_names();
    for sheet in REQUIRED_SHEETS {
        if !names.iter().any(|name| name == sheet) {
            return Err(Error::MissingRequiredSheet {
                sheet: sheet.to_string(),
            });
        }
    }

    let mut sheet = |name: &str| -> Result<Table> {
        let range = workbook.worksheet_range(name)?;
        table_from_range(name, &range)
    };
    Ok(SourceTables {
        styles: sheet(STYLES_SHEET)?,
        settings: sheet(SETTINGS_SHEET)?,
        data: sheet(DATA_SHEET)?,
    })
}

fn header_names(row: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(row.len());
    for cell in row {
        let base = match header_text(cell) {
            text if text.trim().is_empty() => EMPTY_HEADER.to_string(),
            text => text,
        };
        let mut name = base.clone();
        let mut n = 0;
        while names.contains(&name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        names.push(name);
    }
    names
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    }
}

fn table_from_range(sheet: &str, range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        debug!("sheet `{sheet}` is empty");
        return Ok(Table::default());
    };
    let mut table = Table::new(header_names(header))?;

    let (start_row, start_col) = range.start().unwrap_or_default();
    let mut skipped = 0usize;
    for (offset, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            skipped += 1;
            continue;
        }
        let values = row
            .iter()
            .enumerate()
            .map(|(col, data)| {
                convert_cell(data).unwrap_or_else(|| {
                    // Sheet coordinates, 1-based, header included.
                    warn!(
                        "sheet `{sheet}` row {} column {}: error cell {data} read as empty",
                        start_row as usize + offset + 2,
                        start_col as usize + col + 1
                    );
                    Value::Null
                })
            })
            .collect();
        table.push_row(values)?;
    }
    debug!(
        "read sheet `{sheet}`: {} columns, {} rows ({skipped} blank rows skipped)",
        table.column_count(),
        table.row_count()
    );
    Ok(table)
}

/// `None` for error cells. Blank cells read as `""`.
fn convert_cell(data: &Data) -> Option<Value> {
    Some(match data {
        Data::Empty => Value::from(""),
        Data::Bool(b) => Value::Boolean(*b),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Value::from(s.as_str()),
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::Error(_) => return None,
    })
}
