use crate::record::RawHandRecord;

/// One simulation round: its index and one record per seat, in seat order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniqueRound {
    index: u64,
    records: Vec<RawHandRecord>,
}

impl UniqueRound {
    /// A round is assembled in full before it is published, so it never
    /// exists with only some seats recorded.
    pub fn new(index: u64, records: Vec<RawHandRecord>) -> Self {
        Self { index, records }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn records(&self) -> &[RawHandRecord] {
        &self.records
    }

    pub fn seat_count(&self) -> usize {
        self.records.len()
    }
}
