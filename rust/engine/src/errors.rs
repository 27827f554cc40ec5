use thiserror::Error;

/// Errors raised while dealing, evaluating, encoding or running a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Deck exhausted: requested {requested} cards, {remaining} remaining")]
    ExhaustedDeck { requested: usize, remaining: usize },
    #[error("Insufficient cards: {seats} seats need {required} cards, deck holds {available}")]
    InsufficientCards {
        seats: usize,
        required: usize,
        available: usize,
    },
    #[error("Invalid seat count: {seats} (expected {min}..={max})")]
    InvalidSeatCount { seats: usize, min: usize, max: usize },
    #[error("Seat {seat} is outside the {seats}-seat table")]
    UnknownSeat { seat: usize, seats: usize },
    #[error("Invalid round count: rounds must be >= 1")]
    InvalidRoundCount,
    #[error("Encoding overflow: {field} = {value} exceeds {max}")]
    EncodingOverflow {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
    #[error("A simulation is already running")]
    RunnerBusy,
    #[error("Simulation worker exited without reporting an outcome")]
    WorkerLost,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Validation errors are rejected before a run starts; everything else
    /// terminates a run that is already in progress.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SimError::InvalidSeatCount { .. }
                | SimError::InvalidRoundCount
                | SimError::InsufficientCards { .. }
                | SimError::RunnerBusy
        )
    }
}
