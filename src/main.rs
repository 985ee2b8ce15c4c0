mod args;
mod survey;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::args::Args;
use crate::survey::{run_from_args, StderrReporter};

// Some sheets were abandoned after a fatal row error, the others were written.
const EXIT_SHEETS_ABORTED: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match run_from_args(&args, &StderrReporter) {
        Ok(summary) if summary.aborted.is_empty() => {
            info!("Wrote sheets {:?}", summary.written);
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            error!(
                "Wrote sheets {:?}, abandoned sheets {:?}",
                summary.written, summary.aborted
            );
            ExitCode::from(EXIT_SHEETS_ABORTED)
        }
        Err(e) => {
            error!("{}", e);
            let mut cause = e.source();
            while let Some(c) = cause {
                error!("caused by: {}", c);
                cause = c.source();
            }
            ExitCode::FAILURE
        }
    }
}
