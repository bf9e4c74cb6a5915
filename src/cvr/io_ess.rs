use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::cvr::{io_common::Table, *};

/// Reads an ES&S export: the first row is the header, one row per ballot.
///
/// The first worksheet is used unless a name is given.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> CvrResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange: Range<DataType> = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header = iter
        .next()
        .context(EmptyExcelSnafu {})?
        .iter()
        .map(|cell| cell_to_string(cell, 1))
        .collect::<CvrResult<Vec<String>>>()?;
    debug!("read_excel_table: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        debug!("read_excel_table: lineno: {:?} row: {:?}", lineno, row);
        let cells = row
            .iter()
            .map(|cell| cell_to_string(cell, lineno))
            .collect::<CvrResult<Vec<String>>>()?;
        rows.push(cells);
    }
    Ok(Table {
        header,
        rows,
        first_lineno: 2,
    })
}

pub fn cell_to_string(cell: &DataType, lineno: usize) -> CvrResult<String> {
    match cell {
        DataType::String(s) => Ok(s.trim().to_string()),
        DataType::Empty => Ok(String::new()),
        // Ballot ids are often stored as numbers.
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno: lineno as u64,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}
