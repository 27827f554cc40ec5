//! Simulation command handler.
//!
//! Resolves settings (flags over environment over config file over defaults),
//! runs the simulation on the engine's worker thread and streams progress
//! lines to the error stream while it runs. Afterwards the per-seat category
//! table (or JSON with `--json`) goes to the output stream, and the rounds are
//! written to a round log when `--output` is given.
//!
//! A cancelled run (Ctrl+C or `--break-after`) still reports and saves what it
//! completed, then exits with code 130. A failed run does the same with the
//! rounds before the failure and exits with code 2.

use std::io::Write;
use std::path::Path;

use pokersim_engine::logger::{RoundLogHeader, RoundLogWriter};
use pokersim_engine::record::DEFAULT_INDEX_BYTES;
use pokersim_engine::runner::{
    Retention, RunOutcome, RunReport, RunnerConfig, SimulationRunner, StartRequest,
};

use crate::cli::SimArgs;
use crate::config;
use crate::error::CliError;
use crate::formatters::{format_progress, progress_width, write_statistics};
use crate::interrupt;
use crate::io_utils::LogSink;
use crate::ui;
use crate::validation::validate_retention;

pub fn handle_sim_command(
    args: SimArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r.config,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(e.to_string()));
        }
    };

    if let Err(msg) = validate_retention(args.discard_rounds, args.output.as_deref()) {
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    }

    let request = StartRequest::new(
        args.rounds.unwrap_or(resolved.rounds),
        args.seats.map_or(resolved.seats, usize::from),
    );
    if let Some(n) = args.break_after
        && n >= request.rounds
    {
        ui::display_warning(
            err,
            &format!(
                "--break-after {} is not below --rounds {}; the run will complete",
                n, request.rounds
            ),
        )?;
    }
    let runner_config = RunnerConfig {
        seed: args.seed.or(resolved.seed),
        variant: args.variant.unwrap_or(resolved.variant),
        progress_every: args.progress_every.unwrap_or(resolved.progress_every),
        retention: if args.discard_rounds {
            Retention::Discard
        } else {
            Retention::Keep
        },
        parallel: args.parallel || resolved.parallel,
        break_after: args.break_after,
        index_bytes: args.index_bytes.unwrap_or(DEFAULT_INDEX_BYTES),
        ..RunnerConfig::default()
    };

    let runner = SimulationRunner::new(runner_config);
    let mut handle = match runner.start_with_cancel(request, interrupt::token()) {
        Ok(h) => h,
        Err(e) => {
            ui::write_error(err, &e.to_string())?;
            return Err(e.into());
        }
    };

    let width = progress_width(request.rounds);
    while let Some(progress) = handle.progress().blocking_recv() {
        writeln!(err, "{}", format_progress(&progress, width))?;
    }

    match handle.wait() {
        RunOutcome::Completed(report) => {
            finish_report(&report, &args, out, err)?;
            Ok(())
        }
        RunOutcome::Cancelled(report) => {
            finish_report(&report, &args, out, err)?;
            let msg = format!(
                "saved {}/{} rounds",
                report.completed_rounds, report.total_rounds
            );
            writeln!(err, "Interrupted: {}", msg)?;
            Err(CliError::Interrupted(msg))
        }
        RunOutcome::Failed { error, partial } => {
            finish_report(&partial, &args, out, err)?;
            ui::write_error(
                err,
                &format!(
                    "simulation failed after {} rounds: {}",
                    partial.completed_rounds, error
                ),
            )?;
            Err(CliError::Engine(error))
        }
    }
}

fn finish_report(
    report: &RunReport,
    args: &SimArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(path) = &args.output {
        if let Err(e) = write_round_log(Path::new(path), report) {
            ui::write_error(err, &format!("Failed to write {}: {}", path, e))?;
            return Err(e);
        }
    }

    if args.json {
        let doc = serde_json::json!({
            "seed": report.seed,
            "variant": report.variant,
            "seats": report.seats,
            "completed_rounds": report.completed_rounds,
            "total_rounds": report.total_rounds,
            "elapsed_secs": report.elapsed.as_secs_f64(),
            "statistics": report.statistics,
        });
        let json_str = serde_json::to_string_pretty(&doc).map_err(std::io::Error::other)?;
        writeln!(out, "{}", json_str)?;
    } else {
        writeln!(
            out,
            "Simulated: {} rounds x {} seats ({}, seed {}) in {:.3}s",
            report.completed_rounds,
            report.seats,
            report.variant,
            report.seed,
            report.elapsed.as_secs_f64()
        )?;
        write_statistics(out, &report.statistics)?;
    }
    Ok(())
}

fn write_round_log(path: &Path, report: &RunReport) -> Result<(), CliError> {
    let header = RoundLogHeader::for_report(report)?;
    let mut writer = RoundLogWriter::new(LogSink::create(path)?, header)?;
    writer.write_report(report)?;
    let rounds = writer.rounds_written();
    writer.finish()?.close()?;
    tracing::info!(path = %path.display(), rounds, "round log written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rounds: u64, seats: u8) -> SimArgs {
        SimArgs {
            rounds: Some(rounds),
            seats: Some(seats),
            seed: Some(42),
            progress_every: Some(0),
            ..SimArgs::default()
        }
    }

    #[test]
    fn completed_run_prints_table() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        handle_sim_command(args(200, 3), &mut out, &mut err).unwrap();

        let stdout = String::from_utf8(out).unwrap();
        assert!(stdout.starts_with("Simulated: 200 rounds x 3 seats (draw, seed 42)"));
        assert!(stdout.contains("Seat 2: 200 hands"));

        let stderr = String::from_utf8(err).unwrap();
        assert!(stderr.contains("200/200 100.00%"));
    }

    #[test]
    fn break_after_reports_interrupted() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let a = SimArgs {
            break_after: Some(50),
            ..args(100, 2)
        };
        let res = handle_sim_command(a, &mut out, &mut err);
        assert!(matches!(res, Err(CliError::Interrupted(_))));
        let stderr = String::from_utf8(err).unwrap();
        assert!(stderr.contains("Interrupted: saved 50/100 rounds"));
        assert!(String::from_utf8(out).unwrap().contains("Seat 0: 50 hands"));
    }

    #[test]
    fn break_after_past_end_warns_and_completes() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let a = SimArgs {
            break_after: Some(100),
            ..args(40, 2)
        };
        handle_sim_command(a, &mut out, &mut err).unwrap();
        let stderr = String::from_utf8(err).unwrap();
        assert!(stderr.starts_with("WARNING: --break-after 100"));
        assert!(String::from_utf8(out).unwrap().contains("Seat 1: 40 hands"));
    }

    #[test]
    fn failed_run_still_reports_completed_rounds() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let a = SimArgs {
            index_bytes: Some(1),
            ..args(300, 2)
        };
        let res = handle_sim_command(a, &mut out, &mut err);
        assert!(matches!(res, Err(CliError::Engine(_))));
        assert!(String::from_utf8(out).unwrap().contains("Seat 1: 256 hands"));
        let stderr = String::from_utf8(err).unwrap();
        assert!(stderr.contains("Error: simulation failed after 256 rounds"));
    }

    #[test]
    fn discard_with_output_is_rejected() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let a = SimArgs {
            discard_rounds: true,
            output: Some("never-written.pksm".into()),
            ..args(10, 2)
        };
        let res = handle_sim_command(a, &mut out, &mut err);
        assert!(matches!(res, Err(CliError::InvalidInput(_))));
        assert!(!Path::new("never-written.pksm").exists());
    }
}
