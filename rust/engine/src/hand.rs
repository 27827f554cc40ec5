use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// The nine poker hand classes, weakest first. The discriminant is the
/// category ordinal stored in encoded records.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl Category {
    pub const COUNT: usize = 9;

    pub const ALL: [Category; Category::COUNT] = [
        Category::HighCard,
        Category::OnePair,
        Category::TwoPair,
        Category::ThreeOfAKind,
        Category::Straight,
        Category::Flush,
        Category::FullHouse,
        Category::FourOfAKind,
        Category::StraightFlush,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(v: u8) -> Option<Category> {
        Category::ALL.get(v as usize).copied()
    }

    /// Number of significant ranks in this category's tie-break key.
    pub fn key_len(self) -> usize {
        match self {
            Category::StraightFlush | Category::Straight => 1,
            Category::FourOfAKind | Category::FullHouse => 2,
            Category::ThreeOfAKind | Category::TwoPair => 3,
            Category::OnePair => 4,
            Category::Flush | Category::HighCard => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::HighCard => "HighCard",
            Category::OnePair => "OnePair",
            Category::TwoPair => "TwoPair",
            Category::ThreeOfAKind => "ThreeOfAKind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "FullHouse",
            Category::FourOfAKind => "FourOfAKind",
            Category::StraightFlush => "StraightFlush",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exactly five cards held by one seat for one round.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Hand([Card; 5]);

impl Hand {
    pub fn new(cards: [Card; 5]) -> Self {
        Self(cards)
    }

    pub fn cards(&self) -> &[Card; 5] {
        &self.0
    }
}

impl From<[Card; 5]> for Hand {
    fn from(cards: [Card; 5]) -> Self {
        Self(cards)
    }
}

/// Category plus tie-break key. Field order matters: the derived `Ord`
/// compares the category first and the key lexicographically after it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    // kickers: ordered high -> low for tiebreaks, zero-padded
    pub kickers: [u8; 5],
}

impl HandStrength {
    /// The significant prefix of the tie-break key.
    pub fn key(&self) -> &[u8] {
        &self.kickers[..self.category.key_len()]
    }
}

impl fmt::Display for HandStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.category, self.key())
    }
}

/// Classifies a five-card hand. Pure: the same cards always give the same result.
pub fn evaluate_hand(hand: &Hand) -> HandStrength {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut suit_counts = [0u8; 4];
    let mut rank_mask: u16 = 0;
    for c in hand.cards() {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        suit_counts[c.suit.index()] += 1;
        rank_mask |= 1u16 << r;
    }

    let flush = suit_counts.iter().any(|&n| n == 5);
    let straight = straight_high_from_mask(rank_mask);

    // Five distinct ranks are implied by both a straight and a five-card
    // flush, so neither can coexist with a pair or better.
    match (flush, straight) {
        (true, Some(high)) => {
            return HandStrength {
                category: Category::StraightFlush,
                kickers: [high, 0, 0, 0, 0],
            };
        }
        (false, Some(high)) => {
            return HandStrength {
                category: Category::Straight,
                kickers: [high, 0, 0, 0, 0],
            };
        }
        _ => {}
    }

    // (count, rank) groups, largest group first, higher rank first within a size.
    // Reading the ranks in this order yields every multiple-based tie-break key.
    let mut groups = [(0u8, 0u8); 5];
    let mut n = 0;
    for r in (2..=14u8).rev() {
        let count = rank_counts[r as usize];
        if count > 0 {
            groups[n] = (count, r);
            n += 1;
        }
    }
    let groups = &mut groups[..n];
    groups.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut kickers = [0u8; 5];
    for (slot, &(_, r)) in kickers.iter_mut().zip(groups.iter()) {
        *slot = r;
    }

    let category = match (groups[0].0, groups.get(1).map_or(0, |g| g.0)) {
        (4, _) => Category::FourOfAKind,
        (3, 2) => Category::FullHouse,
        _ if flush => Category::Flush,
        (3, _) => Category::ThreeOfAKind,
        (2, 2) => Category::TwoPair,
        (2, _) => Category::OnePair,
        _ => Category::HighCard,
    };

    HandStrength { category, kickers }
}

/// Best five-card strength among `cards` (five to seven cards in practice).
/// Returns `None` when fewer than five cards are given.
pub fn evaluate_best(cards: &[Card]) -> Option<HandStrength> {
    match cards {
        [a, b, c, d, e, ..] => Some(best_of(cards, evaluate_hand(&Hand([*a, *b, *c, *d, *e])))),
        _ => None,
    }
}

/// Best five of seven, as used for two hole cards plus a five-card board.
pub fn evaluate_seven(cards: &[Card; 7]) -> HandStrength {
    let first = Hand([cards[0], cards[1], cards[2], cards[3], cards[4]]);
    best_of(cards, evaluate_hand(&first))
}

fn best_of(cards: &[Card], mut best: HandStrength) -> HandStrength {
    let n = cards.len();
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        let hand = Hand([cards[a], cards[b], cards[c], cards[d], cards[e]]);
                        best = best.max(evaluate_hand(&hand));
                    }
                }
            }
        }
    }
    best
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    // Treat Ace as 14 and optionally as 1
    let mut m = mask;
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    // Sliding 5-bit window from Ace(14) down to 5; the wheel reports 5 high
    for high in (5..=14u8).rev() {
        let window = 0b1_1111u16 << (high - 4);
        if (m & window) == window {
            return Some(high);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_mask_reports_five_high() {
        let mask = (1 << 14) | (1 << 2) | (1 << 3) | (1 << 4) | (1 << 5);
        assert_eq!(straight_high_from_mask(mask), Some(5));
    }

    #[test]
    fn broadway_mask_reports_ace_high() {
        let mask = (1 << 10) | (1 << 11) | (1 << 12) | (1 << 13) | (1 << 14);
        assert_eq!(straight_high_from_mask(mask), Some(14));
    }

    #[test]
    fn gapped_mask_is_not_a_straight() {
        let mask = (1 << 2) | (1 << 3) | (1 << 4) | (1 << 5) | (1 << 7);
        assert_eq!(straight_high_from_mask(mask), None);
    }

    #[test]
    fn category_ordinals_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_ordinal(c.ordinal()), Some(c));
        }
        assert_eq!(Category::from_ordinal(9), None);
    }
}
