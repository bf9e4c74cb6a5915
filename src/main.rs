use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

mod args;
mod cvr;

use crate::args::Args;
use crate::cvr::{CvrError, ConversionOptions};

fn report_error(e: &CvrError) {
    warn!("Error occured {:?}", e);
    eprintln!("An error occured {}", e);
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Some(check_path) = &args.check {
        match cvr::run_check(check_path) {
            Ok(report) if report.is_valid() => {
                info!("{} is a valid report", check_path);
                std::process::exit(0)
            }
            Ok(report) => {
                eprintln!(
                    "{} has {} structural problems",
                    check_path,
                    report.problems.len()
                );
                std::process::exit(-1)
            }
            Err(e) => {
                report_error(&e);
                std::process::exit(1)
            }
        }
    }

    let config_path = match &args.config {
        Some(p) => p.clone(),
        None => {
            eprintln!("No configuration given: use --config <file> or --check <file>");
            std::process::exit(1)
        }
    };

    let options = ConversionOptions {
        input: args.input.clone(),
        input_type: args.input_type.clone(),
        excel_worksheet_name: args.excel_worksheet_name.clone(),
        limit: args.limit,
        reference: args.reference.clone(),
    };

    let res = cvr::run_conversion(&config_path, &options)
        .and_then(|xml| cvr::write_output(args.out.as_deref(), &xml));
    if let Err(e) = res {
        report_error(&e);
        std::process::exit(1)
    }
}
