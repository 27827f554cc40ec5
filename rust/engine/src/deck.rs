use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::SimError;

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// Canonical order, shuffled later from an entropy-seeded generator.
    pub fn new() -> Self {
        Self::new_with_seed(rand::random())
    }

    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            position: 0,
            rng,
        }
    }

    /// Deck for one simulation round: the generator is stream `round` of
    /// `seed`, so every round gets an independent, reproducible permutation.
    pub fn for_round(seed: u64, round: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        rng.set_stream(round);
        Self {
            cards: full_deck(),
            position: 0,
            rng,
        }
    }

    /// A stacked deck that deals `cards` in the given order. Shuffling it
    /// afterwards falls back to the full 52-card universe.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards,
            position: 0,
            rng: ChaCha20Rng::seed_from_u64(0),
        }
    }

    /// Restores all 52 cards and applies a Fisher-Yates shuffle.
    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        if self.position >= self.cards.len() {
            None
        } else {
            let c = self.cards[self.position];
            self.position += 1;
            Some(c)
        }
    }

    /// Removes `n` cards from the front of the current permutation.
    pub fn draw(&mut self, n: usize) -> Result<Vec<Card>, SimError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(SimError::ExhaustedDeck {
                requested: n,
                remaining,
            });
        }
        let drawn = self.cards[self.position..self.position + n].to_vec();
        self.position += n;
        Ok(drawn)
    }

    pub fn burn_card(&mut self) {
        let _ = self.deal_card();
    }

    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.position = 0;
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}
