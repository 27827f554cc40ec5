//! Command handlers, one module per subcommand.
//!
//! Each module exposes `handle_<command>_command(...) -> Result<(), CliError>`
//! and writes only to the `&mut dyn Write` streams it is given.

mod bench;
mod cfg;
mod deal;
mod eval;
mod sim;
mod stats;

pub use bench::handle_bench_command;
pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use eval::handle_eval_command;
pub use sim::handle_sim_command;
pub use stats::handle_stats_command;
