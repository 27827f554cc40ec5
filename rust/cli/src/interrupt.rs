//! Ctrl+C wiring. The first interrupt trips a process-wide cancel token that
//! every simulation started by this process observes.

use std::sync::OnceLock;

use pokersim_engine::runner::CancelToken;

static TOKEN: OnceLock<CancelToken> = OnceLock::new();

pub fn token() -> CancelToken {
    TOKEN.get_or_init(CancelToken::new).clone()
}

/// Spawns a watcher thread that waits for Ctrl+C on a small tokio runtime.
pub fn install() {
    let cancel = token();
    let spawned = std::thread::Builder::new()
        .name("pokersim-signal".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::warn!(error = %e, "signal runtime unavailable; Ctrl+C will not cancel runs");
                    return;
                }
            };
            if rt.block_on(tokio::signal::ctrl_c()).is_ok() {
                tracing::warn!("interrupt received, cancelling");
                cancel.cancel();
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "failed to spawn signal watcher");
    }
}
