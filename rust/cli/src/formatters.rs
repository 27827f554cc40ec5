//! Card, hand, progress and statistics formatters for terminal display.
//!
//! Card suits use Unicode symbols (♥ ♦ ♣ ♠) where the terminal supports them
//! and fall back to letters (h d c s) elsewhere.
//!
//! ```rust
//! use pokersim_engine::cards::{Card, Rank, Suit};
//! use pokersim_cli::formatters::format_card;
//!
//! let ace_spades = Card::new(Rank::Ace, Suit::Spades);
//! assert!(format_card(&ace_spades) == "A♠" || format_card(&ace_spades) == "As");
//! ```

use std::io::Write;

use pokersim_engine::cards::{Card, Rank};
use pokersim_engine::hand::{Category, HandStrength};
use pokersim_engine::runner::Progress;
use pokersim_engine::stats::Statistics;

/// On Windows, only modern terminals (Windows Terminal, VS Code, anything
/// setting TERM_PROGRAM) are trusted with Unicode; elsewhere it is assumed.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

pub fn format_card(card: &Card) -> String {
    let suit = if supports_unicode() {
        card.suit.symbol()
    } else {
        card.suit.letter()
    };
    format!("{}{}", card.rank.label(), suit)
}

pub fn format_cards(cards: &[Card]) -> String {
    cards.iter().map(format_card).collect::<Vec<_>>().join(" ")
}

/// `"TwoPair [9 2 5]"`: category then the significant tie-break ranks.
pub fn format_strength(strength: &HandStrength) -> String {
    let key: Vec<String> = strength
        .key()
        .iter()
        .map(|&v| {
            Rank::from_u8(v)
                .map(|r| r.label().to_string())
                .unwrap_or_else(|| v.to_string())
        })
        .collect();
    format!("{} [{}]", strength.category, key.join(" "))
}

/// Digits needed to print `total`, used to zero-pad the completed count.
pub fn progress_width(total: u64) -> usize {
    total.max(1).to_string().len()
}

/// `"005000/10000 50.00% 0.412s"`.
pub fn format_progress(progress: &Progress, width: usize) -> String {
    format!(
        "{:0width$}/{} {:5.2}% {:5.3}s",
        progress.completed_rounds,
        progress.total_rounds,
        progress.percent(),
        progress.elapsed_secs(),
        width = width
    )
}

/// One block per seat: every category with its count and share.
pub fn write_statistics(out: &mut dyn Write, stats: &Statistics) -> std::io::Result<()> {
    for seat in 0..stats.seat_count() {
        writeln!(out, "Seat {}: {} hands", seat, stats.total(seat))?;
        for category in Category::ALL.iter().rev() {
            writeln!(
                out,
                "  {:<14}{:>10} {:>7.3}%",
                category.name(),
                stats.count(seat, *category),
                stats.frequency(seat, *category) * 100.0
            )?;
        }
    }
    Ok(())
}
