//! # Announcements Telemetry
//!
//! Logging setup for applications and tests using the `announcements`
//! crate. The library itself only emits `tracing` events; this crate
//! installs a subscriber for them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use announcements_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_logging(&config).expect("Failed to init logging");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ANN_SERVICE_NAME` | `announcements` | Service name in the startup log |
//! | `ANN_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `ANN_CONSOLE_OUTPUT` | `true` | Emit formatted output |
//! | `ANN_JSON_LOGS` | `false` | JSON instead of pretty output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, LoggingGuard};

use thiserror::Error;

/// Logging initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(String),
}

/// Install logging for a test binary. An already installed subscriber is
/// fine; any other failure is returned.
pub fn init_test_logging() -> Result<(), TelemetryError> {
    match init_logging(&TelemetryConfig::for_tests()) {
        Ok(_) | Err(TelemetryError::AlreadyInitialized(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
