//! # Pokersim CLI Library
//!
//! Command-line front end for the `pokersim-engine` Monte-Carlo simulator.
//! The binary is a thin wrapper around [`run`], which parses arguments,
//! dispatches to a subcommand handler and maps the result to an exit code.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["pokersim", "sim", "--rounds", "10000", "--seats", "4", "--seed", "7"];
//! let code = pokersim_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `sim`: Run a simulation, print per-seat category counts, optionally save a round log
//! - `deal`: Deal and evaluate one round
//! - `eval`: Evaluate five to seven cards
//! - `stats`: Re-aggregate statistics from a round log
//! - `bench`: Benchmark hand evaluation performance
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod interrupt;
pub mod io_utils;
pub mod logging;
mod macros;
pub mod ui;
pub mod validation;

use cli::{Commands, PokersimCli};
use commands::{
    handle_bench_command, handle_cfg_command, handle_deal_command, handle_eval_command,
    handle_sim_command, handle_stats_command,
};

pub use error::CliError;

/// Parses `args` and runs the selected command.
///
/// Returns `0` on success, `2` on any error and `130` when a simulation was
/// cancelled before finishing. Help and version text go to `out`.
///
/// ```
/// use std::io;
/// let args = vec!["pokersim", "eval", "As", "Ks", "Qs", "Js", "Ts"];
/// let code = pokersim_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    const COMMANDS: &[&str] = &["sim", "deal", "eval", "stats", "bench", "cfg"];
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match PokersimCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                write_or_exit!(out, "{}", e);
                return exit_code::SUCCESS;
            }
            write_or_exit!(err, "{}", e);
            write_or_exit!(err, "Pokersim CLI");
            write_or_exit!(err, "Usage: pokersim <command> [options]\n");
            write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                write_or_exit!(err, "  {}", c);
            }
            write_or_exit!(err, "\nFor full help, run: pokersim --help");
            return exit_code::ERROR;
        }
    };

    let result = match cli.cmd {
        Commands::Sim(args) => handle_sim_command(args, out, err),
        Commands::Deal {
            seats,
            seed,
            variant,
            round,
        } => handle_deal_command(seats, seed, variant, round, out),
        Commands::Eval { cards } => handle_eval_command(&cards, out, err),
        Commands::Stats { input, json } => handle_stats_command(&input, json, out, err),
        Commands::Bench { hands, seed } => handle_bench_command(hands, seed, out),
        Commands::Cfg => handle_cfg_command(out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(_)) => exit_code::INTERRUPTED,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}
