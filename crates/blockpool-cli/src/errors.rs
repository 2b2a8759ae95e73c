//! Error handling and exit codes.

use blockpool::PoolError;

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: u8 = 0;
    /// Generic error, including allocator refusal.
    pub const ERROR_GENERIC: u8 = 1;
    /// Invalid pool shape.
    pub const ERROR_CONFIG: u8 = 4;
}

/// Map a top-level error to the process exit code.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PoolError>() {
        Some(pool_err) if pool_err.is_config() => exit_codes::ERROR_CONFIG,
        _ => exit_codes::ERROR_GENERIC,
    }
}
