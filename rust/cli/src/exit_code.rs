//! Process exit codes shared by every command.

/// Success exit code (standard Unix convention).
pub const SUCCESS: i32 = 0;

/// Validation, configuration, I/O or engine failure.
pub const ERROR: i32 = 2;

/// Run cancelled (Ctrl+C or `--break-after`) with partial results reported.
pub const INTERRUPTED: i32 = 130;
