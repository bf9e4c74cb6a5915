use log::{debug, info, warn};

use cast_vote_records::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::cvr::config_reader::*;
use crate::cvr::io_common::{simplify_file_name, InputProvider, Table};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_ess;

#[derive(Debug, Snafu)]
pub enum CvrError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The spreadsheet has no worksheet or no header row"))]
    EmptyExcel {},
    #[snafu(display("Worksheet {name:?} not found"))]
    MissingWorksheet { name: String },
    #[snafu(display("Line {lineno}: could not understand the cell {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening the CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading the CSV file at line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error reading file {path}"))]
    OpeningDocument {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("{source}"))]
    Conversion { source: CvrErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CvrResult<T> = Result<T, CvrError>;

/// The settings of a conversion that may override the catalog.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ConversionOptions {
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    pub limit: Option<usize>,
    pub reference: Option<String>,
}

// Paths in the catalog are relative to the catalog itself.
fn input_location(
    config_path: &str,
    config: &CvrConfig,
    options: &ConversionOptions,
) -> CvrResult<String> {
    if let Some(p) = &options.input {
        return Ok(p.clone());
    }
    let file_path = match config.input.as_ref().and_then(|i| i.file_path.clone()) {
        Some(p) => p,
        None => whatever!(
            "No input file: set input.filePath in {} or use --input",
            config_path
        ),
    };
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;
    let p: PathBuf = root_p.join(file_path);
    Ok(p.as_path().display().to_string())
}

fn input_provider(
    path: &str,
    config: &CvrConfig,
    options: &ConversionOptions,
) -> CvrResult<InputProvider> {
    let name = options
        .input_type
        .clone()
        .or_else(|| config.input.as_ref().and_then(|i| i.provider.clone()));
    match name {
        Some(n) => match InputProvider::parse(&n) {
            Some(p) => Ok(p),
            None => whatever!("Provider not implemented {:?}", n),
        },
        None => Ok(InputProvider::from_path(path)),
    }
}

fn read_table(
    path: &str,
    provider: InputProvider,
    config: &CvrConfig,
    options: &ConversionOptions,
) -> CvrResult<Table> {
    info!(
        "Attempting to read ballot file {:?} ({:?})",
        simplify_file_name(path),
        provider
    );
    match provider {
        InputProvider::Csv => io_csv::read_csv_table(path),
        InputProvider::Xlsx => {
            let worksheet = options.excel_worksheet_name.clone().or_else(|| {
                config
                    .input
                    .as_ref()
                    .and_then(|i| i.excel_worksheet_name.clone())
            });
            io_ess::read_excel_table(path, worksheet.as_deref())
        }
    }
}

/// Reads the catalog and the ballots it points to, and returns the report as XML.
///
/// Nothing is returned unless all the ballots could be converted.
pub fn run_conversion(config_path: &str, options: &ConversionOptions) -> CvrResult<String> {
    let config = read_config(config_path)?;
    let catalog = build_catalog(&config)?;
    let rules = translation_rules(config.input.as_ref());
    debug!("run_conversion: rules: {:?}", rules);

    let path = input_location(config_path, &config, options)?;
    let provider = input_provider(&path, &config, options)?;
    let table = read_table(&path, provider, &config, options)?.limited(options.limit);
    info!(
        "Read {} ballots with {} columns",
        table.rows.len(),
        table.header.len()
    );

    let cvrs = translate_rows(
        &catalog,
        &rules,
        &table.header,
        &table.rows,
        table.first_lineno,
    )
    .context(ConversionSnafu {})?;
    let report = CastVoteRecordReport::assemble(&catalog, cvrs, &report_settings(&config));
    let xml = report.to_xml().context(ConversionSnafu {})?;

    // The reference report, if provided for comparison
    if let Some(reference_path) = &options.reference {
        compare_with_reference(reference_path, &xml)?;
    }
    Ok(xml)
}

// The generation date differs between two runs.
fn without_generated_date(xml: &str) -> String {
    xml.lines()
        .filter(|l| !l.trim_start().starts_with("<GeneratedDate>"))
        .collect::<Vec<&str>>()
        .join("\n")
}

pub fn compare_with_reference(reference_path: &str, xml: &str) -> CvrResult<()> {
    let reference = fs::read_to_string(reference_path).context(OpeningDocumentSnafu {
        path: reference_path,
    })?;
    let expected = without_generated_date(&reference);
    let actual = without_generated_date(xml);
    if expected != actual {
        warn!("Found differences with the reference report");
        print_diff(expected.as_str(), actual.as_str(), "\n");
        whatever!(
            "Difference detected between the generated report and the reference {}",
            reference_path
        )
    }
    info!("The report matches the reference {}", reference_path);
    Ok(())
}

/// Checks the structure of an existing report.
///
/// An invalid report is not an error: the problems are in the returned value.
pub fn run_check(path: &str) -> CvrResult<CheckReport> {
    let contents = fs::read_to_string(path).context(OpeningDocumentSnafu { path })?;
    let report = check_document(&contents);
    for problem in report.problems.iter() {
        warn!("{}: {}", simplify_file_name(path), problem);
    }
    Ok(report)
}

/// Writes to the given file, or to the standard output if no file (or `stdout`) is given.
pub fn write_output(out: Option<&str>, xml: &str) -> CvrResult<()> {
    match out {
        None | Some("") | Some("stdout") => {
            print!("{}", xml);
            Ok(())
        }
        Some(path) => {
            fs::write(path, xml).context(WritingOutputSnafu { path })?;
            info!("Wrote report to {}", path);
            Ok(())
        }
    }
}
