//! Conditional logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! Modules with chatty worker paths define `const ENABLE_LOGS: bool = ...;`
//! and use these instead of the raw `log` macros so the noise can be shut
//! off per module without touching the global filter level.

/// Initialize `env_logger` for an embedding binary or test harness.
/// Reads `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
