//! Deal command handler: one round, every seat's cards and evaluation.
//!
//! The round is dealt exactly as a simulation with the same seed would deal
//! it, so `deal --seed S --round N` shows round N of `sim --seed S`.

use std::io::Write;

use pokersim_engine::dealer::{Deal, Dealer, Variant};

use crate::config;
use crate::error::CliError;
use crate::formatters::{format_cards, format_strength};

pub fn handle_deal_command(
    seats: Option<u8>,
    seed: Option<u64>,
    variant: Option<Variant>,
    round: u64,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved = config::load_with_sources()
        .map_err(|e| CliError::Config(e.to_string()))?
        .config;
    let seats = seats.map_or(resolved.seats, usize::from);
    let seed = seed.or(resolved.seed).unwrap_or_else(rand::random);
    let variant = variant.unwrap_or(resolved.variant);

    let dealer = Dealer::with_variant(seed, variant);
    let deal = dealer.deal_round(round, seats)?;
    let strengths = deal.evaluate();

    writeln!(out, "Seed: {} Round: {} Variant: {}", seed, round, variant)?;
    if let Deal::Holdem { board, .. } = &deal {
        writeln!(out, "Board: {}", format_cards(board))?;
    }
    for (seat, strength) in strengths.iter().enumerate() {
        let cards = deal.seat_cards(seat);
        let own = match &deal {
            Deal::Draw(_) => &cards[..],
            Deal::Holdem { .. } => &cards[..2],
        };
        writeln!(
            out,
            "Seat {}: {}  {}",
            seat,
            format_cards(own),
            format_strength(strength)
        )?;
    }
    Ok(())
}
