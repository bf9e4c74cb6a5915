use clap::Parser;

/// Converts a table of ballots into a NIST cast vote records (CVR) report in XML.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The catalog describing the election, in JSON. It lists the parties, candidates and
    /// contests, and where to find the ballots. See the manual of the cast_vote_records crate for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference report in XML. If provided, cvrconv will check that the generated
    /// report matches the reference (the generation date is not compared).
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the report. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The table of ballots. Setting this option overrides the path that may be
    /// specified in the catalog.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. Setting this option overrides the provider of the catalog.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (number) Only converts the first ballots of the table.
    #[clap(long, value_parser)]
    pub limit: Option<usize>,

    /// (file path) Checks the structure of an existing report instead of converting ballots.
    #[clap(long, value_parser)]
    pub check: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
