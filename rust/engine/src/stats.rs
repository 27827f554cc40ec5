use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::SimError;
use crate::hand::Category;

/// Occurrence counts for one seat, indexed by category ordinal.
pub type CategoryCounts = [u64; Category::COUNT];

/// Per-seat category tallies. Every seat row holds all nine categories from
/// the start; counts only ever go up.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Statistics {
    seats: Vec<CategoryCounts>,
}

impl Statistics {
    pub fn new(seat_count: usize) -> Self {
        Self {
            seats: vec![[0; Category::COUNT]; seat_count],
        }
    }

    pub fn record(&mut self, seat: usize, category: Category) -> Result<(), SimError> {
        let seats = self.seats.len();
        let row = self
            .seats
            .get_mut(seat)
            .ok_or(SimError::UnknownSeat { seat, seats })?;
        row[category as usize] += 1;
        Ok(())
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn count(&self, seat: usize, category: Category) -> u64 {
        self.seats
            .get(seat)
            .map_or(0, |row| row[category as usize])
    }

    pub fn seat(&self, seat: usize) -> Option<&CategoryCounts> {
        self.seats.get(seat)
    }

    /// Hands recorded for `seat`; equals the completed round count.
    pub fn total(&self, seat: usize) -> u64 {
        self.seats.get(seat).map_or(0, |row| row.iter().sum())
    }

    /// Share of `seat`'s hands that landed in `category`, 0.0 when empty.
    pub fn frequency(&self, seat: usize, category: Category) -> f64 {
        let total = self.total(seat);
        if total == 0 {
            0.0
        } else {
            self.count(seat, category) as f64 / total as f64
        }
    }

    /// Counts summed over all seats.
    pub fn combined(&self) -> CategoryCounts {
        let mut all = [0; Category::COUNT];
        for row in &self.seats {
            for (acc, n) in all.iter_mut().zip(row) {
                *acc += n;
            }
        }
        all
    }

    /// True when every seat holds exactly `rounds` hands.
    pub fn is_conserved(&self, rounds: u64) -> bool {
        (0..self.seats.len()).all(|seat| self.total(seat) == rounds)
    }
}

impl Serialize for Statistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.seats.len()))?;
        for (seat, row) in self.seats.iter().enumerate() {
            let per_category: BTreeMap<&'static str, u64> = Category::ALL
                .iter()
                .map(|&c| (c.name(), row[c as usize]))
                .collect();
            map.serialize_entry(&seat.to_string(), &per_category)?;
        }
        map.end()
    }
}
