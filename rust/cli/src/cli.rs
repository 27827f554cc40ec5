//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};
use pokersim_engine::dealer::Variant;

#[derive(Parser, Debug)]
#[command(
    name = "pokersim",
    version,
    about = "Monte-Carlo poker hand simulator"
)]
pub struct PokersimCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a simulation and print per-seat category counts
    Sim(SimArgs),
    /// Deal a single round and show every seat's hand
    Deal {
        #[arg(long, value_parser = clap::value_parser!(u8).range(2..=10))]
        seats: Option<u8>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        variant: Option<Variant>,
        #[arg(long, default_value_t = 0)]
        round: u64,
    },
    /// Evaluate five to seven cards, e.g. `eval As Kd Qh Jc Ts`
    Eval {
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },
    /// Re-aggregate statistics from a round log
    Stats {
        #[arg(long)]
        input: String,
        #[arg(long)]
        json: bool,
    },
    /// Time the hand evaluator
    Bench {
        #[arg(long, default_value_t = 200_000)]
        hands: u64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SimArgs {
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub rounds: Option<u64>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(2..=10))]
    pub seats: Option<u8>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub variant: Option<Variant>,
    /// Rounds between progress lines (0 prints only the final line)
    #[arg(long)]
    pub progress_every: Option<u64>,
    /// Cancel cooperatively after this many rounds
    #[arg(long)]
    pub break_after: Option<u64>,
    #[arg(long)]
    pub parallel: bool,
    /// Round-index width in bytes for records and the round log (default 4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub index_bytes: Option<u8>,
    /// Keep statistics only; incompatible with --output
    #[arg(long)]
    pub discard_rounds: bool,
    /// Write a round log; a `.zst` suffix compresses it
    #[arg(long)]
    pub output: Option<String>,
    #[arg(long)]
    pub json: bool,
}
