//! Logging and observability
//!
//! Structured logging with:
//! - Console output on stderr, filtered by `RUST_LOG` or the configured level
//! - Optional JSON log files with daily, hourly or no rotation
//!
//! # Example
//!
//! ```no_run
//! use bastion::config::LoggingConfig;
//! use bastion::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(collection = "characters", "Migration started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard, LOG_FILE_NAME};

/// Log the start of an engine operation
///
/// # Example
///
/// ```no_run
/// use bastion::log_operation_start;
///
/// log_operation_start!("migrate_all", "characters");
/// ```
#[macro_export]
macro_rules! log_operation_start {
    ($operation:expr, $scope:expr) => {
        tracing::info!(
            operation = $operation,
            scope = %$scope,
            "Starting operation"
        );
    };
}

/// Log the completion of an engine operation
///
/// # Example
///
/// ```no_run
/// use bastion::log_operation_complete;
/// use std::time::Duration;
///
/// log_operation_complete!("export", true, Duration::from_millis(250));
/// ```
#[macro_export]
macro_rules! log_operation_complete {
    ($operation:expr, $success:expr, $duration:expr) => {
        tracing::info!(
            operation = $operation,
            success = $success,
            duration_ms = $duration.as_millis() as u64,
            "Operation finished"
        );
    };
}
