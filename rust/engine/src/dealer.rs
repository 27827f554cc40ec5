use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::{Deck, DECK_SIZE};
use crate::errors::SimError;
use crate::hand::{evaluate_hand, evaluate_seven, Hand, HandStrength};

/// Cards per seat in a single-draw deal.
pub const HAND_SIZE: usize = 5;
pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 10;

/// How a round is dealt.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Five private cards per seat, evaluated as-is.
    #[default]
    Draw,
    /// Two hole cards per seat plus a shared five-card board (burns before
    /// flop, turn and river); each seat plays its best five of seven.
    Holdem,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Draw => "draw",
            Variant::Holdem => "holdem",
        }
    }

    /// Cards consumed from the deck when dealing `seats` seats.
    pub fn cards_needed(self, seats: usize) -> usize {
        match self {
            Variant::Draw => seats * HAND_SIZE,
            Variant::Holdem => seats * 2 + 5 + 3,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Variant::Draw => 0,
            Variant::Holdem => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Variant> {
        match code {
            0 => Some(Variant::Draw),
            1 => Some(Variant::Holdem),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draw" => Ok(Variant::Draw),
            "holdem" | "hold'em" => Ok(Variant::Holdem),
            other => Err(format!("unknown variant '{}' (expected draw or holdem)", other)),
        }
    }
}

/// The cards dealt to every seat for one round.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Deal {
    Draw(Vec<Hand>),
    Holdem {
        holes: Vec<[Card; 2]>,
        board: [Card; 5],
    },
}

impl Deal {
    pub fn seat_count(&self) -> usize {
        match self {
            Deal::Draw(hands) => hands.len(),
            Deal::Holdem { holes, .. } => holes.len(),
        }
    }

    /// Every card visible to `seat`: its hand, or its hole cards followed by the board.
    pub fn seat_cards(&self, seat: usize) -> Vec<Card> {
        match self {
            Deal::Draw(hands) => hands
                .get(seat)
                .map(|h| h.cards().to_vec())
                .unwrap_or_default(),
            Deal::Holdem { holes, board } => holes
                .get(seat)
                .map(|hole| hole.iter().chain(board.iter()).copied().collect())
                .unwrap_or_default(),
        }
    }

    /// Evaluated strength per seat, in seat order.
    pub fn evaluate(&self) -> Vec<HandStrength> {
        match self {
            Deal::Draw(hands) => hands.iter().map(evaluate_hand).collect(),
            Deal::Holdem { holes, board } => holes
                .iter()
                .map(|hole| {
                    evaluate_seven(&[
                        hole[0], hole[1], board[0], board[1], board[2], board[3], board[4],
                    ])
                })
                .collect(),
        }
    }
}

/// Deals rounds. Each round gets a fresh deck drawn from its own generator
/// stream, so no state carries from one round to the next.
#[derive(Debug, Clone)]
pub struct Dealer {
    seed: u64,
    variant: Variant,
}

impl Dealer {
    pub fn new(seed: u64) -> Self {
        Self::with_variant(seed, Variant::Draw)
    }

    pub fn with_variant(seed: u64, variant: Variant) -> Self {
        Self { seed, variant }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn shuffled_deck(&self, round: u64) -> Deck {
        let mut deck = Deck::for_round(self.seed, round);
        deck.shuffle();
        deck
    }

    /// Deals `seat_count` disjoint five-card hands round-robin: the k-th card
    /// off the deck goes to seat `k % seat_count`.
    pub fn deal(&self, deck: &mut Deck, seat_count: usize) -> Result<Vec<Hand>, SimError> {
        check_card_budget(Variant::Draw, seat_count)?;
        let cards = deck.draw(seat_count * HAND_SIZE)?;
        let hands = (0..seat_count)
            .map(|seat| {
                let mut hand = [cards[seat]; HAND_SIZE];
                for (pass, slot) in hand.iter_mut().enumerate().skip(1) {
                    *slot = cards[pass * seat_count + seat];
                }
                Hand::new(hand)
            })
            .collect();
        Ok(hands)
    }

    /// Hold'em procedure: two hole cards round-robin, then burn-and-turn for
    /// the flop, turn and river.
    pub fn deal_holdem(&self, deck: &mut Deck, seat_count: usize) -> Result<Deal, SimError> {
        check_card_budget(Variant::Holdem, seat_count)?;
        let hole_cards = deck.draw(seat_count * 2)?;
        let holes = (0..seat_count)
            .map(|seat| [hole_cards[seat], hole_cards[seat_count + seat]])
            .collect();

        deck.burn_card();
        let flop = deck.draw(3)?;
        deck.burn_card();
        let turn = deck.draw(1)?;
        deck.burn_card();
        let river = deck.draw(1)?;

        Ok(Deal::Holdem {
            holes,
            board: [flop[0], flop[1], flop[2], turn[0], river[0]],
        })
    }

    /// Deals with this dealer's variant from the given deck.
    pub fn deal_with(&self, deck: &mut Deck, seat_count: usize) -> Result<Deal, SimError> {
        match self.variant {
            Variant::Draw => self.deal(deck, seat_count).map(Deal::Draw),
            Variant::Holdem => self.deal_holdem(deck, seat_count),
        }
    }

    /// Fresh shuffled deck for `round`, dealt to `seat_count` seats.
    pub fn deal_round(&self, round: u64, seat_count: usize) -> Result<Deal, SimError> {
        let mut deck = self.shuffled_deck(round);
        self.deal_with(&mut deck, seat_count)
    }
}

/// Fails with [`SimError::InsufficientCards`] before any card is drawn.
pub fn check_card_budget(variant: Variant, seat_count: usize) -> Result<(), SimError> {
    let required = variant.cards_needed(seat_count);
    if required > DECK_SIZE {
        return Err(SimError::InsufficientCards {
            seats: seat_count,
            required,
            available: DECK_SIZE,
        });
    }
    Ok(())
}
