//! Statistics command for round logs.
//!
//! Reads a round log (plain or `.zst`), re-aggregates per-seat category
//! counts from its records and verifies that every seat holds exactly one
//! hand per round recorded in the header.

use std::io::Write;
use std::path::Path;

use pokersim_engine::logger::RoundLogReader;

use crate::error::CliError;
use crate::formatters::write_statistics;
use crate::io_utils::open_log_source;
use crate::ui;

pub fn handle_stats_command(
    input: &str,
    json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let path = Path::new(input);
    let source = match open_log_source(path) {
        Ok(s) => s,
        Err(e) => {
            ui::write_error(err, &format!("Failed to open {}: {}", input, e))?;
            return Err(CliError::Io(e));
        }
    };
    let reader = match RoundLogReader::new(source) {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("{}: {}", input, e))?;
            return Err(e.into());
        }
    };
    let header = reader.header().clone();
    let stats = match reader.read_statistics() {
        Ok(s) => s,
        Err(e) => {
            ui::write_error(err, &format!("{}: {}", input, e))?;
            return Err(e.into());
        }
    };

    if !stats.is_conserved(header.rounds) {
        let msg = format!(
            "{}: seat totals do not match the {} rounds in the header",
            input, header.rounds
        );
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    }

    if json {
        let doc = serde_json::json!({
            "header": header,
            "created_at": header.created_at().map(|t| t.to_rfc3339()),
            "statistics": stats,
        });
        let json_str = serde_json::to_string_pretty(&doc).map_err(std::io::Error::other)?;
        writeln!(out, "{}", json_str)?;
    } else {
        writeln!(
            out,
            "Rounds: {} Seats: {} Variant: {} Seed: {}",
            header.rounds, header.seats, header.variant, header.seed
        )?;
        write_statistics(out, &stats)?;
    }
    Ok(())
}
