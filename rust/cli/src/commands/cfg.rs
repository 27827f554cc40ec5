//! Configuration command handler.
//!
//! Prints the resolved configuration as JSON, each value paired with the
//! layer it came from:
//!
//! ```json
//! {
//!   "seats": {
//!     "value": 4,
//!     "source": "default"
//!   },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(format!("Invalid configuration: {}", e)));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "seats": {
            "value": config.seats,
            "source": sources.seats,
        },
        "rounds": {
            "value": config.rounds,
            "source": sources.rounds,
        },
        "variant": {
            "value": config.variant,
            "source": sources.variant,
        },
        "progress_every": {
            "value": config.progress_every,
            "source": sources.progress_every,
        },
        "parallel": {
            "value": config.parallel,
            "source": sources.parallel,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
