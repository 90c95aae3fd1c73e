//! # Error Types
//!
//! Errors are returned to the direct caller; the announcer never swallows a
//! handler fault.

use crate::subscriber::SubscriptionId;
use std::fmt;
use thiserror::Error;

/// Errors from registry operations on an [`Announcer`](crate::Announcer).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnnouncerError {
    /// Handler declares more arguments than the (announcement, announcer)
    /// pair an announcer can supply.
    #[error(
        "Invalid handler: declares {declared} arguments, at most {} are supported",
        crate::MAX_HANDLER_ARGUMENTS
    )]
    InvalidHandler { declared: usize },

    /// Subscription targets no kind at all.
    #[error("Invalid handler: subscription kind set is empty")]
    EmptyKindSet,

    /// Handle is not (or no longer) registered with this announcer.
    #[error("Not subscribed: {0}")]
    NotSubscribed(SubscriptionId),

    /// Weak/strong switching needs a receiver-bound (`send`/`to`) handler.
    #[error("Subscription {0} has no receiver object")]
    NoReceiver(SubscriptionId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A single handler failure during `announce`.
#[derive(Debug)]
pub struct HandlerFault {
    /// Subscription whose handler failed.
    pub subscription: SubscriptionId,
    /// What the handler returned.
    pub error: anyhow::Error,
}

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.subscription, self.error)
    }
}

/// Errors surfaced by `announce`.
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// One or more handlers failed. Faults are listed in dispatch order.
    #[error("{} handler(s) failed while announcing {kind}: {}", .faults.len(), render(.faults))]
    HandlersFailed {
        kind: &'static str,
        faults: Vec<HandlerFault>,
    },
}

impl AnnounceError {
    /// The individual handler faults.
    #[must_use]
    pub fn faults(&self) -> &[HandlerFault] {
        match self {
            Self::HandlersFailed { faults, .. } => faults,
        }
    }
}

fn render(faults: &[HandlerFault]) -> String {
    faults
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from typed attribute reads on an announcement.
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("Attribute not set: {0}")]
    Missing(String),

    #[error("Attribute {name} has an unexpected type: {source}")]
    Invalid {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handler_message() {
        let err = AnnouncerError::InvalidHandler { declared: 3 };
        assert_eq!(
            err.to_string(),
            "Invalid handler: declares 3 arguments, at most 2 are supported"
        );
    }

    #[test]
    fn test_handlers_failed_lists_every_fault() {
        let first = SubscriptionId::new();
        let second = SubscriptionId::new();
        let err = AnnounceError::HandlersFailed {
            kind: "Event",
            faults: vec![
                HandlerFault {
                    subscription: first,
                    error: anyhow::anyhow!("boom"),
                },
                HandlerFault {
                    subscription: second,
                    error: anyhow::anyhow!("bang"),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.starts_with("2 handler(s) failed while announcing Event"));
        assert!(message.contains(&format!("{first}: boom")));
        assert!(message.contains(&format!("{second}: bang")));
        assert_eq!(err.faults().len(), 2);
    }
}
