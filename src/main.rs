//! # walksat
//!
//! `walksat` is a command-line front end for the GSAT and WalkSAT local search
//! procedures of the `walksat` library.
//!
//! ## Usage
//!
//! ```sh
//! walksat [OPTIONS] [PATH] [SUBCOMMAND]
//! ```
//!
//! -   `walksat <path>` solves a clause file, or every `.cnf`/`.txt` file below
//!     a directory.
//! -   `walksat file --path <path>` does the same with per-command options.
//! -   `walksat text --input "1 -2\n2 3"` solves clauses given inline.
//! -   `walksat completions <shell>` prints shell completions.
//!
//! Input is either plain text (one clause per line) or DIMACS CNF, detected
//! from the presence of a `p cnf` line unless `--dialect` says otherwise.
//!
//! ## Exit status
//!
//! -   `10`: a model was found for every instance.
//! -   `0`: the search budget ran out before a model was found. Local search
//!     cannot prove unsatisfiability, so this is reported as UNKNOWN.
//! -   `1`: the input or the options were invalid.
//!
//! Logging goes through `env_logger`; `--debug` lowers the default level to
//! `debug`, and `RUST_LOG` overrides both.

use crate::command_line::cli::{
    Cli, Commands, parse_text, print_completions, solve_and_report, solve_path,
};
use clap::Parser;
use log::error;
use std::process::ExitCode;
use std::time::Instant;
use walksat::sat::error::{Result, SatError};

mod command_line;

/// Global allocator using `tikv-jemallocator` for memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Dispatches to the command handler. `Ok(true)` means every instance was satisfied.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Some(Commands::File { path, common }) => solve_path(&path, &common),
        Some(Commands::Text { input, common }) => {
            let time = Instant::now();
            let cnf = parse_text(&input, &common)?;
            let parse_time = time.elapsed();
            solve_and_report(&cnf, &common, None, parse_time, common.output.as_deref())
        }
        Some(Commands::Completions { shell }) => {
            print_completions(shell);
            Ok(true)
        }
        None => match &cli.path {
            Some(path) => solve_path(path, &cli.common),
            None => Err(SatError::InvalidConfig(
                "no input given; pass a path or use the `file` or `text` subcommand".to_string(),
            )),
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.active_options().debug);
    let completions = matches!(cli.command, Some(Commands::Completions { .. }));

    match run(cli) {
        Ok(_) if completions => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(10),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
