//! # Handlers
//!
//! What a subscription runs when an announcement matches. The arity is an
//! explicit variant chosen when the handler is built:
//!
//! | Arity            | Receives                     |
//! |------------------|------------------------------|
//! | `Action`         | nothing                      |
//! | `Event`          | the announcement             |
//! | `EventAnnouncer` | the announcement, announcer  |
//!
//! Handlers are either bare closures or bound to a receiver object (the
//! `send`/`to` form), in which case the announcer can also hold the
//! receiver weakly and drop the subscription with it.
//!
//! A handler may return `()` or any `Result<(), E>` with
//! `E: Into<anyhow::Error>`; see [`Outcome`].

use crate::announcement::Announcement;
use crate::error::AnnouncerError;
use crate::publisher::Announcer;
use crate::MAX_HANDLER_ARGUMENTS;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased receiver object of a `send`/`to` handler.
pub(crate) type Receiver = Arc<dyn Any + Send + Sync>;

/// Type-erased entry point shared by every handler flavour.
pub(crate) type Invoke =
    dyn Fn(Option<&(dyn Any + Send + Sync)>, &Delivery<'_>) -> anyhow::Result<()> + Send + Sync;

/// Everything a handler may be handed during one delivery.
pub(crate) struct Delivery<'a> {
    pub announcement: &'a Announcement,
    pub announcer: &'a Announcer,
}

/// Number of arguments a handler is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// `()`
    Action,
    /// `(announcement)`
    Event,
    /// `(announcement, announcer)`
    EventAnnouncer,
}

impl Arity {
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Action => 0,
            Self::Event => 1,
            Self::EventAnnouncer => 2,
        }
    }
}

impl TryFrom<usize> for Arity {
    type Error = AnnouncerError;

    fn try_from(declared: usize) -> Result<Self, Self::Error> {
        if declared > MAX_HANDLER_ARGUMENTS {
            return Err(AnnouncerError::InvalidHandler { declared });
        }
        Ok(match declared {
            0 => Self::Action,
            1 => Self::Event,
            _ => Self::EventAnnouncer,
        })
    }
}

/// Positional argument handed to a [`Handler::variadic`] handler.
#[derive(Clone, Copy)]
pub enum Argument<'a> {
    Announcement(&'a Announcement),
    Announcer(&'a Announcer),
}

impl<'a> Argument<'a> {
    #[must_use]
    pub fn as_announcement(&self) -> Option<&'a Announcement> {
        match self {
            Self::Announcement(announcement) => Some(announcement),
            Self::Announcer(_) => None,
        }
    }

    #[must_use]
    pub fn as_announcer(&self) -> Option<&'a Announcer> {
        match self {
            Self::Announcer(announcer) => Some(announcer),
            Self::Announcement(_) => None,
        }
    }
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Announcement(announcement) => {
                f.debug_tuple("Announcement").field(announcement).finish()
            }
            Self::Announcer(announcer) => f.debug_tuple("Announcer").field(announcer).finish(),
        }
    }
}

/// Return values a handler may produce.
pub trait Outcome {
    /// Collapse into the announcer's fault representation.
    fn into_outcome(self) -> anyhow::Result<()>;
}

impl Outcome for () {
    fn into_outcome(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E: Into<anyhow::Error>> Outcome for Result<(), E> {
    fn into_outcome(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

/// A subscriber callable together with its declared arity.
#[derive(Clone)]
pub struct Handler {
    declared: usize,
    receiver: Option<Receiver>,
    invoke: Arc<Invoke>,
}

impl Handler {
    /// Zero-argument handler.
    pub fn action<F, R>(action: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Outcome,
    {
        Self::unbound(Arity::Action, move |_: &Delivery<'_>| action().into_outcome())
    }

    /// Handler receiving the announcement.
    pub fn event<F, R>(handler: F) -> Self
    where
        F: Fn(&Announcement) -> R + Send + Sync + 'static,
        R: Outcome,
    {
        Self::unbound(Arity::Event, move |delivery: &Delivery<'_>| {
            handler(delivery.announcement).into_outcome()
        })
    }

    /// Handler receiving the announcement and the announcer delivering it.
    pub fn event_announcer<F, R>(handler: F) -> Self
    where
        F: Fn(&Announcement, &Announcer) -> R + Send + Sync + 'static,
        R: Outcome,
    {
        Self::unbound(Arity::EventAnnouncer, move |delivery: &Delivery<'_>| {
            handler(delivery.announcement, delivery.announcer).into_outcome()
        })
    }

    /// Call `method` on `to` with no arguments.
    pub fn send_action<T, M, R>(to: &Arc<T>, method: M) -> Self
    where
        T: Send + Sync + 'static,
        M: Fn(&T) -> R + Send + Sync + 'static,
        R: Outcome,
    {
        Self::bound(Arity::Action, to, move |target: &T, _: &Delivery<'_>| {
            method(target).into_outcome()
        })
    }

    /// Call `method` on `to` with the announcement.
    pub fn send<T, M, R>(to: &Arc<T>, method: M) -> Self
    where
        T: Send + Sync + 'static,
        M: Fn(&T, &Announcement) -> R + Send + Sync + 'static,
        R: Outcome,
    {
        Self::bound(Arity::Event, to, move |target: &T, delivery: &Delivery<'_>| {
            method(target, delivery.announcement).into_outcome()
        })
    }

    /// Call `method` on `to` with the announcement and the announcer.
    pub fn send_with_announcer<T, M, R>(to: &Arc<T>, method: M) -> Self
    where
        T: Send + Sync + 'static,
        M: Fn(&T, &Announcement, &Announcer) -> R + Send + Sync + 'static,
        R: Outcome,
    {
        Self::bound(
            Arity::EventAnnouncer,
            to,
            move |target: &T, delivery: &Delivery<'_>| {
                method(target, delivery.announcement, delivery.announcer).into_outcome()
            },
        )
    }

    /// Handler described at runtime by its declared parameter count.
    ///
    /// It is called with exactly `declared` positional arguments taken from
    /// `(announcement, announcer)`. Counts above [`MAX_HANDLER_ARGUMENTS`]
    /// are rejected by `subscribe`, not here.
    pub fn variadic<F, R>(declared: usize, handler: F) -> Self
    where
        F: for<'a> Fn(&[Argument<'a>]) -> R + Send + Sync + 'static,
        R: Outcome,
    {
        let invoke = move |_: Option<&(dyn Any + Send + Sync)>, delivery: &Delivery<'_>| {
            let arguments = [
                Argument::Announcement(delivery.announcement),
                Argument::Announcer(delivery.announcer),
            ];
            let passed = arguments.get(..declared).unwrap_or(&arguments[..]);
            handler(passed).into_outcome()
        };
        Self {
            declared,
            receiver: None,
            invoke: Arc::new(invoke),
        }
    }

    /// Declared parameter count, before validation.
    #[must_use]
    pub fn declared_arguments(&self) -> usize {
        self.declared
    }

    /// Validated arity.
    ///
    /// # Errors
    ///
    /// [`AnnouncerError::InvalidHandler`] if more than
    /// [`MAX_HANDLER_ARGUMENTS`] arguments are declared.
    pub fn arity(&self) -> Result<Arity, AnnouncerError> {
        Arity::try_from(self.declared)
    }

    /// Whether this handler is bound to a receiver object.
    #[must_use]
    pub fn has_receiver(&self) -> bool {
        self.receiver.is_some()
    }

    pub(crate) fn into_parts(self) -> (Option<Receiver>, Arc<Invoke>) {
        (self.receiver, self.invoke)
    }

    fn unbound<F>(arity: Arity, call: F) -> Self
    where
        F: Fn(&Delivery<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let invoke =
            move |_: Option<&(dyn Any + Send + Sync)>, delivery: &Delivery<'_>| call(delivery);
        Self {
            declared: arity.count(),
            receiver: None,
            invoke: Arc::new(invoke),
        }
    }

    fn bound<T, F>(arity: Arity, to: &Arc<T>, call: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &Delivery<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let receiver: Receiver = to.clone();
        let invoke =
            move |receiver: Option<&(dyn Any + Send + Sync)>, delivery: &Delivery<'_>| {
                let target = receiver
                    .and_then(|object| object.downcast_ref::<T>())
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "receiver {} is no longer available",
                            std::any::type_name::<T>()
                        )
                    })?;
                call(target, delivery)
            };
        Self {
            declared: arity.count(),
            receiver: Some(receiver),
            invoke: Arc::new(invoke),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("declared", &self.declared)
            .field("has_receiver", &self.has_receiver())
            .finish_non_exhaustive()
    }
}

/// Address identifying a receiver object, used for
/// [`Announcer::unsubscribe_receiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ReceiverId(usize);

impl ReceiverId {
    pub(crate) fn of<T: ?Sized>(receiver: &Arc<T>) -> Self {
        Self(Arc::as_ptr(receiver).cast::<()>() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_counts() {
        assert_eq!(Arity::Action.count(), 0);
        assert_eq!(Arity::Event.count(), 1);
        assert_eq!(Arity::EventAnnouncer.count(), 2);
    }

    #[test]
    fn test_arity_from_declared_count() {
        assert_eq!(Arity::try_from(0_usize), Ok(Arity::Action));
        assert_eq!(Arity::try_from(1_usize), Ok(Arity::Event));
        assert_eq!(Arity::try_from(2_usize), Ok(Arity::EventAnnouncer));
        assert_eq!(
            Arity::try_from(MAX_HANDLER_ARGUMENTS + 1),
            Err(AnnouncerError::InvalidHandler { declared: 3 })
        );
    }

    #[test]
    fn test_constructors_record_arity() {
        assert_eq!(Handler::action(|| ()).arity(), Ok(Arity::Action));
        assert_eq!(Handler::event(|_| ()).arity(), Ok(Arity::Event));
        assert_eq!(
            Handler::event_announcer(|_, _| ()).arity(),
            Ok(Arity::EventAnnouncer)
        );
        assert!(Handler::variadic(3, |_| ()).arity().is_err());
    }

    #[test]
    fn test_bound_handlers_carry_receiver() {
        struct Target;
        let receiver = Arc::new(Target);

        let handler = Handler::send(&receiver, |_: &Target, _| ());
        assert!(handler.has_receiver());
        assert!(!Handler::event(|_| ()).has_receiver());
        assert_eq!(Arc::strong_count(&receiver), 2);
    }

    #[test]
    fn test_outcome_conversions() {
        assert!(().into_outcome().is_ok());
        assert!(Ok::<(), std::io::Error>(()).into_outcome().is_ok());
        let failed: Result<(), anyhow::Error> = Err(anyhow::anyhow!("boom"));
        assert_eq!(failed.into_outcome().unwrap_err().to_string(), "boom");
    }

    #[test]
    fn test_receiver_id_matches_erased_arc() {
        let receiver = Arc::new(5_u32);
        let erased: Receiver = receiver.clone();
        assert_eq!(ReceiverId::of(&receiver), ReceiverId::of(&erased));
    }
}
