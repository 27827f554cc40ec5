//! Input parsing and validation for command arguments.

use std::collections::HashSet;

use pokersim_engine::cards::Card;

/// Accepted card counts for `eval`.
pub const MIN_EVAL_CARDS: usize = 5;
pub const MAX_EVAL_CARDS: usize = 7;

/// Parses card tokens such as `As`, `td`, `10h` or `2♣`. Tokens may also be
/// joined with commas. Duplicates are rejected.
///
/// ```rust
/// # use pokersim_cli::validation::parse_cards;
/// let cards = parse_cards(&["As,Kd", "Qh", "Jc", "10s"]).unwrap();
/// assert_eq!(cards.len(), 5);
/// assert!(parse_cards(&["As", "As", "Kd", "Qh", "Jc"]).is_err());
/// ```
pub fn parse_cards<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Card>, String> {
    let mut seen = HashSet::new();
    let mut cards = Vec::new();
    for token in tokens
        .iter()
        .flat_map(|t| t.as_ref().split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let card: Card = token
            .parse()
            .map_err(|e| format!("Invalid card '{}': {}", token, e))?;
        if !seen.insert(card) {
            return Err(format!("Duplicate card: {}", token));
        }
        cards.push(card);
    }
    Ok(cards)
}

/// [`parse_cards`] plus the five-to-seven card count `eval` needs.
pub fn parse_eval_cards<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Card>, String> {
    let cards = parse_cards(tokens)?;
    if !(MIN_EVAL_CARDS..=MAX_EVAL_CARDS).contains(&cards.len()) {
        return Err(format!(
            "Expected {} to {} cards, got {}",
            MIN_EVAL_CARDS,
            MAX_EVAL_CARDS,
            cards.len()
        ));
    }
    Ok(cards)
}

/// `--output` writes every round, so it cannot be combined with discarding them.
pub fn validate_retention(discard_rounds: bool, output: Option<&str>) -> Result<(), String> {
    match (discard_rounds, output) {
        (true, Some(path)) => Err(format!(
            "--discard-rounds drops the rounds --output {} would write",
            path
        )),
        _ => Ok(()),
    }
}
