//! Eval command handler: classify five to seven cards given on the command line.

use std::io::Write;

use pokersim_engine::hand::evaluate_best;
use pokersim_engine::record::RawHandRecord;

use crate::error::CliError;
use crate::formatters::{format_cards, format_strength};
use crate::ui;
use crate::validation::parse_eval_cards;

/// Prints the best five-card strength and its packed record key (round 0,
/// seat 0) in hex.
pub fn handle_eval_command(
    cards: &[String],
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let cards = match parse_eval_cards(cards) {
        Ok(c) => c,
        Err(msg) => {
            ui::write_error(err, &msg)?;
            return Err(CliError::InvalidInput(msg));
        }
    };
    let strength = evaluate_best(&cards)
        .ok_or_else(|| CliError::InvalidInput("at least five cards required".into()))?;
    let record = RawHandRecord::encode(0, 0, &strength)?;
    let hex: String = record
        .as_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();

    writeln!(out, "Cards: {}", format_cards(&cards))?;
    writeln!(out, "Hand: {}", format_strength(&strength))?;
    writeln!(out, "Record: {}", hex)?;
    Ok(())
}
