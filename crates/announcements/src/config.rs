//! Announcer configuration and validation
//!
//! # Example
//!
//! ```rust
//! use announcements::{AnnouncerConfigBuilder, FaultPolicy};
//!
//! let config = AnnouncerConfigBuilder::new()
//!     .name("ui")
//!     .fault_policy(FaultPolicy::FailFast)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.name, "ui");
//! ```

use crate::error::AnnouncerError;
use serde::{Deserialize, Serialize};

/// What `announce` does when a handler fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Keep delivering to the remaining handlers, then report every fault.
    #[default]
    DeliverAll,
    /// Stop at the first fault and report it.
    FailFast,
}

/// Announcer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncerConfig {
    /// Name used in log fields and `Display`.
    pub name: String,
    /// Handler fault policy.
    pub fault_policy: FaultPolicy,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            name: "announcer".to_string(),
            fault_policy: FaultPolicy::DeliverAll,
        }
    }
}

impl AnnouncerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), AnnouncerError> {
        if self.name.trim().is_empty() {
            return Err(AnnouncerError::InvalidConfig(
                "name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder-style method to set the fault policy
    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }
}

/// Builder for AnnouncerConfig with validation
#[derive(Default)]
pub struct AnnouncerConfigBuilder {
    name: Option<String>,
    fault_policy: Option<FaultPolicy>,
}

impl AnnouncerConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = Some(fault_policy);
        self
    }

    /// Build the AnnouncerConfig, validating all parameters
    pub fn build(self) -> Result<AnnouncerConfig, AnnouncerError> {
        let defaults = AnnouncerConfig::default();

        let config = AnnouncerConfig {
            name: self.name.unwrap_or(defaults.name),
            fault_policy: self.fault_policy.unwrap_or(defaults.fault_policy),
        };

        config.validate()?;
        Ok(config)
    }
}
