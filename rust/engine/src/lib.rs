//! # pokersim-engine: Monte-Carlo Poker Hand Simulation
//!
//! Deals independent rounds of poker from seeded decks, classifies every
//! seat's best five-card hand, packs each result into a compact binary record
//! and tallies per-seat category frequencies. Runs execute on a worker thread
//! and report progress and completion through channels.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and parsing
//! - [`deck`] - Seeded 52-card deck on ChaCha20 with per-round streams
//! - [`dealer`] - Round-robin dealing for five-card draw and Hold'em
//! - [`hand`] - Hand categories, evaluation and comparison
//! - [`record`] - Packed binary hand records and the stream codec
//! - [`round`] - One round's records
//! - [`stats`] - Per-seat category counts
//! - [`runner`] - Run lifecycle, progress, cancellation
//! - [`logger`] - Binary round log files
//! - [`errors`] - Error types
//!
//! ## Quick Start
//!
//! ```rust
//! use pokersim_engine::runner::{RunOutcome, RunnerConfig, SimulationRunner, StartRequest};
//!
//! let config = RunnerConfig {
//!     seed: Some(42),
//!     ..RunnerConfig::default()
//! };
//! let runner = SimulationRunner::new(config);
//! let handle = runner.start(StartRequest::new(500, 4)).unwrap();
//! match handle.wait() {
//!     RunOutcome::Completed(report) => assert!(report.statistics.is_conserved(500)),
//!     other => panic!("unexpected outcome: {:?}", other.state()),
//! }
//! ```
//!
//! ## Evaluating a Hand
//!
//! ```rust
//! use pokersim_engine::cards::Card;
//! use pokersim_engine::hand::{evaluate_hand, Category, Hand};
//!
//! let cards: Vec<Card> = ["9h", "9c", "2d", "2s", "5h"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//! let hand = Hand::new([cards[0], cards[1], cards[2], cards[3], cards[4]]);
//! let strength = evaluate_hand(&hand);
//! assert_eq!(strength.category, Category::TwoPair);
//! assert_eq!(strength.key(), &[9, 2, 5]);
//! ```

pub mod cards;
pub mod dealer;
pub mod deck;
pub mod errors;
pub mod hand;
pub mod logger;
pub mod record;
pub mod round;
pub mod runner;
pub mod stats;
