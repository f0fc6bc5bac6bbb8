#![allow(clippy::cast_precision_loss)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use log::{debug, error, info, warn};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use walksat::sat::cnf::Cnf;
use walksat::sat::dimacs::{Dialect, find_instances, parse_cnf, parse_file, write_solution_file};
use walksat::sat::error::{Result, SatError};
use walksat::sat::observer::LogObserver;
use walksat::sat::parallel::search_parallel;
use walksat::sat::restarter::RestarterType;
use walksat::sat::solver::{Budget, SearchConfig, SearchOutcome, SearchReport};
use walksat::sat::variable_selection::{Noise, Strategy};

/// Defines the command-line interface for the local search solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "walksat", version, about = "GSAT and WalkSAT local search for CNF formulas")]
pub(crate) struct Cli {
    /// An optional path argument. If provided without a subcommand, it's
    /// treated as the file (or directory of files) to solve.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (`file`, `text` or `completions`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

impl Cli {
    /// The options in effect: those of the subcommand if one was given.
    pub(crate) fn active_options(&self) -> &CommonOptions {
        match &self.command {
            Some(Commands::File { common, .. } | Commands::Text { common, .. }) => common,
            Some(Commands::Completions { .. }) | None => &self.common,
        }
    }
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a clause file, or every `.cnf`/`.txt` file below a directory.
    File {
        /// Path to the file or directory.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve clauses provided as text.
    Text {
        /// Clause text, one clause per line (e.g. "1 -2\n2 3"). DIMACS text with
        /// a `p cnf` line is recognised as well.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check a found model against the instance before reporting it.
    #[arg(short, long, default_value_t = false)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = false)]
    pub(crate) stats: bool,

    /// Print the model as signed literals if one is found.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Variable selection heuristic.
    #[arg(long, value_enum, default_value_t = Strategy::WalkSat)]
    pub(crate) strategy: Strategy,

    /// Noise threshold: a random walk step happens when a uniform draw exceeds it.
    #[arg(long, default_value_t = Noise::DEFAULT_THRESHOLD)]
    pub(crate) noise: f64,

    /// Maximum number of flips; 0 removes the limit.
    #[arg(long, default_value_t = SearchConfig::DEFAULT_MAX_FLIPS)]
    pub(crate) max_flips: usize,

    /// Wall-clock limit in seconds.
    #[arg(long)]
    pub(crate) time_limit: Option<f64>,

    /// Restart strategy.
    #[arg(long, value_enum, default_value_t = RestarterType::Never)]
    pub(crate) restart: RestarterType,

    /// Flips per try for `fixed`, unit length for `luby`.
    #[arg(long, default_value_t = SearchConfig::DEFAULT_RESTART_INTERVAL)]
    pub(crate) restart_interval: usize,

    /// Seed for the random stream; runs with the same seed repeat exactly.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Number of independent searches raced in parallel.
    #[arg(long, default_value_t = 1)]
    pub(crate) threads: usize,

    /// Write the model here (one literal per line). For a directory run this
    /// names a directory receiving one `.sol` file per instance.
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,

    /// Input dialect; detected from the text when omitted.
    #[arg(long, value_enum)]
    pub(crate) dialect: Option<Dialect>,
}

impl CommonOptions {
    /// Builds and validates the search configuration.
    ///
    /// # Errors
    ///
    /// `SatError::InvalidConfig` for an out-of-range noise threshold or time limit.
    pub(crate) fn to_config(&self) -> Result<SearchConfig> {
        let time_limit = self
            .time_limit
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|e| {
                    SatError::InvalidConfig(format!("invalid time limit {secs}: {e}"))
                })
            })
            .transpose()?;
        let budget = Budget {
            max_flips: (self.max_flips > 0).then_some(self.max_flips),
            time_limit,
        };

        let mut config = SearchConfig::default()
            .with_strategy(self.strategy)
            .with_noise_threshold(self.noise)
            .with_budget(budget)
            .with_restart(self.restart, self.restart_interval);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Prints shell completions for the command line to stdout.
pub(crate) fn print_completions(shell: clap_complete::Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "walksat", &mut std::io::stdout());
}

/// Parses clause text, using the configured dialect or detecting one.
///
/// # Errors
///
/// Parse and instance construction errors.
pub(crate) fn parse_text(input: &str, common: &CommonOptions) -> Result<Cnf> {
    let dialect = common.dialect.unwrap_or_else(|| Dialect::detect(input));
    parse_cnf(Cursor::new(input), dialect)
}

/// Solves one file, or every instance below a directory.
///
/// Returns whether every instance was satisfied.
///
/// # Errors
///
/// If the path cannot be read or an instance is malformed.
pub(crate) fn solve_path(path: &Path, common: &CommonOptions) -> Result<bool> {
    if path.is_dir() {
        return solve_dir(path, common);
    }

    let time = Instant::now();
    let cnf = parse_file(path, common.dialect)?;
    let parse_time = time.elapsed();
    solve_and_report(&cnf, common, Some(path), parse_time, common.output.as_deref())
}

/// Solves every instance file found below `path`.
///
/// A malformed file is reported and skipped; the run continues with the next one.
///
/// # Errors
///
/// If `path` is not a readable directory or the configuration is invalid, and
/// `SatError::UnreadableInstances` once all files ran if any were skipped.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<bool> {
    let files = find_instances(path)?;
    info!("found {} instance files under {}", files.len(), path.display());

    if let Some(out_dir) = &common.output {
        std::fs::create_dir_all(out_dir)?;
    }

    let mut satisfied = 0;
    let mut failed = 0;
    for file in &files {
        let time = Instant::now();
        let cnf = match parse_file(file, common.dialect) {
            Ok(cnf) => cnf,
            Err(e) => {
                error!("skipping {}: {e}", file.display());
                failed += 1;
                continue;
            }
        };
        let parse_time = time.elapsed();

        let output = match &common.output {
            Some(out_dir) => Some(solution_path(path, out_dir, file)?),
            None => None,
        };
        if solve_and_report(&cnf, common, Some(file), parse_time, output.as_deref())? {
            satisfied += 1;
        }
    }

    println!(
        "\nSolved {satisfied} of {} instances ({failed} unreadable)",
        files.len()
    );
    if failed > 0 {
        return Err(SatError::UnreadableInstances {
            failed,
            total: files.len(),
        });
    }
    Ok(satisfied == files.len())
}

/// Where the model of `file` goes: its path below `root`, mirrored under
/// `out_dir`, with `.sol` appended to the full file name.
fn solution_path(root: &Path, out_dir: &Path, file: &Path) -> Result<PathBuf> {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut name = relative.as_os_str().to_owned();
    name.push(".sol");
    let target = out_dir.join(name);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(target)
}

/// Allocated and resident memory in MiB, as reported by jemalloc.
fn memory_mib() -> (f64, f64) {
    if let Err(e) = epoch::advance() {
        warn!("jemalloc statistics unavailable: {e}");
        return (0.0, 0.0);
    }
    let allocated = stats::allocated::read().unwrap_or(0);
    let resident = stats::resident::read().unwrap_or(0);
    (
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    )
}

/// Runs the configured search on `cnf` and reports the result.
///
/// Returns `true` if a model was found (and, with `--verify`, checked).
///
/// # Errors
///
/// An invalid configuration, or failing to write the model to `output`.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
    output: Option<&Path>,
) -> Result<bool> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    debug!(
        "instance: {} variables, {} clauses, {} literals",
        cnf.num_vars(),
        cnf.num_clauses(),
        cnf.num_literals()
    );

    let config = common.to_config()?;
    let report = search_parallel(cnf, &config, common.threads, LogObserver)?;

    let literals = match report.outcome.assignment() {
        Some(model) => Some(cnf.to_literals(model)?),
        None => None,
    };

    let mut satisfied = literals.is_some();
    if common.verify {
        if let Some(literals) = &literals {
            let ok = cnf.verify(literals)?;
            println!("Verified: {ok}");
            if !ok {
                error!("model failed verification");
                satisfied = false;
            }
        }
    }

    if let (Some(path), Some(literals)) = (output, &literals) {
        write_solution_file(path, literals)?;
        info!("solution written to {}", path.display());
    }

    if common.stats {
        let (allocated, resident) = memory_mib();
        print_stats(parse_time, cnf, &config, &report, allocated, resident);
    }

    if common.print_solution {
        if let Some(literals) = &literals {
            println!("Solution: {}", literals.iter().join(" "));
        }
    }

    match &report.outcome {
        SearchOutcome::Satisfied { iterations, .. } => {
            println!("\nSATISFIABLE (after {iterations} flips)");
        }
        SearchOutcome::Exhausted { iterations, reason } => {
            println!("\nUNKNOWN ({reason} after {iterations} flips)");
        }
    }

    Ok(satisfied)
}

/// Formats a single statistic as a table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) -> String {
    format!("|  {label:<28} {value:>18}  |")
}

/// Formats a statistic that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) -> String {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    format!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |")
}

/// The problem and search statistics table, one row per line.
pub(crate) fn stats_table(
    parse_time: Duration,
    cnf: &Cnf,
    config: &SearchConfig,
    report: &SearchReport,
    allocated: f64,
    resident: f64,
) -> Vec<String> {
    let s = &report.stats;
    let elapsed_secs = s.elapsed.as_secs_f64();

    vec![
        "\n=======================[ Problem Statistics ]=========================".to_string(),
        stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64())),
        stat_line("Variables", cnf.num_vars()),
        stat_line("Clauses", cnf.num_clauses()),
        stat_line("Literals", cnf.num_literals()),
        "========================[ Search Statistics ]========================".to_string(),
        stat_line("Strategy", config.strategy),
        stat_line("Noise threshold", config.noise_threshold),
        stat_line("Restart strategy", config.restart),
        stat_line_with_rate("Flips", s.flips, elapsed_secs),
        stat_line_with_rate("Greedy flips", s.greedy_flips, elapsed_secs),
        stat_line_with_rate("Noise flips", s.noise_flips, elapsed_secs),
        stat_line_with_rate("Restarts", s.restarts, elapsed_secs),
        stat_line("Memory usage (MiB)", format!("{allocated:.2}")),
        stat_line("Resident memory (MiB)", format!("{resident:.2}")),
        // wall-clock; a parallel run reports the duration of the whole race
        stat_line("Search time (s)", format!("{elapsed_secs:.3}")),
        "=====================================================================".to_string(),
    ]
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats(
    parse_time: Duration,
    cnf: &Cnf,
    config: &SearchConfig,
    report: &SearchReport,
    allocated: f64,
    resident: f64,
) {
    for line in stats_table(parse_time, cnf, config, report, allocated, resident) {
        println!("{line}");
    }
}
