//! Bench command handler: evaluator throughput.
//!
//! Deals `hands` seven-card hands from a seeded deck, reshuffling whenever
//! fewer than seven cards remain, and times the best-of-seven evaluation.

use std::io::Write;

use pokersim_engine::cards::Card;
use pokersim_engine::deck::Deck;
use pokersim_engine::hand::{Category, evaluate_seven};

use crate::error::CliError;

pub fn handle_bench_command(hands: u64, seed: u64, out: &mut dyn Write) -> Result<(), CliError> {
    if hands == 0 {
        return Err(CliError::InvalidInput("hands must be >= 1".into()));
    }
    let mut deck = Deck::new_with_seed(seed);
    deck.shuffle();
    let mut counts = [0u64; Category::COUNT];

    let start = std::time::Instant::now();
    for _ in 0..hands {
        if deck.remaining() < 7 {
            deck.shuffle();
        }
        let drawn = deck.draw(7)?;
        let seven: [Card; 7] = [
            drawn[0], drawn[1], drawn[2], drawn[3], drawn[4], drawn[5], drawn[6],
        ];
        counts[evaluate_seven(&seven).category as usize] += 1;
    }
    let dur = start.elapsed();

    let per_sec = hands as f64 / dur.as_secs_f64().max(f64::EPSILON);
    writeln!(
        out,
        "Benchmark: {} hands in {:?} ({:.0} hands/sec)",
        hands, dur, per_sec
    )?;
    for category in Category::ALL.iter().rev() {
        writeln!(out, "  {:<14}{:>10}", category.name(), counts[*category as usize])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_command_output_format() {
        let mut out = Vec::new();
        handle_bench_command(500, 1, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("Benchmark: 500 hands in"));
        assert!(output.contains("hands/sec"));
        let total: u64 = output
            .lines()
            .skip(1)
            .filter_map(|l| l.split_whitespace().last()?.parse::<u64>().ok())
            .sum();
        assert_eq!(total, 500);
    }

    #[test]
    fn test_bench_rejects_zero_hands() {
        let mut out = Vec::new();
        assert!(handle_bench_command(0, 1, &mut out).is_err());
    }
}
