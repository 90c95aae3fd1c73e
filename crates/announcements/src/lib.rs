//! # Announcements - Synchronous Typed Events
//!
//! Announcements encode events (a button click, a state change) as kinds.
//! An [`Announcer`] keeps an ordered registry of subscriptions and delivers
//! each announcement, synchronously, to every subscription whose kind
//! matches it or one of its ancestors.
//!
//! ```text
//! ┌──────────────┐   subscribe(kind, handler)   ┌──────────────┐
//! │  Subscriber  │ ───────────────────────────▶ │  Announcer   │
//! │              │ ◀─────────────────────────── │              │
//! └──────────────┘    handler(announcement)     └──────────────┘
//!                                                      ▲
//!                                                      │ announce(announcement)
//!                                               ┌──────────────┐
//!                                               │    Caller    │
//!                                               └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use announcements::{Announcement, Announcer, Handler, Kind};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! static EVENT: Kind = Kind::root("Event");
//!
//! let announcer = Announcer::new();
//! let total = Arc::new(AtomicU64::new(0));
//!
//! let sink = Arc::clone(&total);
//! announcer
//!     .subscribe(&EVENT, Handler::event(move |event: &Announcement| {
//!         let payload: u64 = event.try_get("payload")?;
//!         sink.fetch_add(payload, Ordering::SeqCst);
//!         Ok::<(), anyhow::Error>(())
//!     }))
//!     .unwrap();
//!
//! let event = Announcement::new(&EVENT);
//! event.set("payload", 42);
//! announcer.announce(event).unwrap();
//!
//! assert_eq!(total.load(Ordering::SeqCst), 42);
//! ```
//!
//! ## Semantics
//!
//! - **Polymorphic matching:** a subscription for `Event` also receives
//!   announcements of any kind declared as a descendant of `Event`.
//! - **Ordering:** most specific kind first, then registration order.
//! - **Faults:** handler errors never abort silently; see [`FaultPolicy`].
//! - **Thread safety:** the registry sits behind one lock and handlers run
//!   with it released.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod announcement;
pub mod config;
pub mod error;
pub mod handler;
pub mod kind;
pub mod publisher;
pub mod spy;
pub mod subscriber;

// Re-export main types
pub use announcement::{Announcement, Attributes};
pub use config::{AnnouncerConfig, AnnouncerConfigBuilder, FaultPolicy};
pub use error::{AnnounceError, AnnouncerError, AttributeError, HandlerFault};
pub use handler::{Argument, Arity, Handler, Outcome};
pub use kind::{Kind, KindSet, Lineage};
pub use publisher::Announcer;
pub use spy::{AnnouncementSpy, Observed};
pub use subscriber::{Strength, SubscriptionHandle, SubscriptionId};

/// Largest number of arguments a handler can be called with.
pub const MAX_HANDLER_ARGUMENTS: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_handler_arguments() {
        assert_eq!(MAX_HANDLER_ARGUMENTS, Arity::EventAnnouncer.count());
    }

    #[test]
    fn test_announcer_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Announcer>();
        assert_send_sync::<Announcement>();
        assert_send_sync::<Handler>();
    }
}
