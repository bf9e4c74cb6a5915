// Primitives for reading CSV files.

use crate::cvr::{io_common::Table, *};

/// Reads a CSV file whose first line is the header.
///
/// Rows may have any number of cells: missing cells are reported when the
/// ballots are translated.
pub fn read_csv_table(path: &str) -> CvrResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header: Vec<String> = match records.next() {
        Some(line_r) => line_r
            .context(CsvLineParseSnafu { lineno: 1usize })?
            .iter()
            .map(|s| s.trim().to_string())
            .collect(),
        None => whatever!("The CSV file {} is empty", path),
    };
    debug!("read_csv_table: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, line);
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(Table {
        header,
        rows,
        first_lineno: 2,
    })
}
