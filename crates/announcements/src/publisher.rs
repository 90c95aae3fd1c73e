//! # Announcer
//!
//! Registry plus synchronous dispatcher. `announce` returns only after every
//! matching handler has run.
//!
//! ## Dispatch order
//!
//! ```text
//! announce(ChildEvent)
//!     │
//!     ├─▶ subscriptions for ChildEvent     (registration order)
//!     ├─▶ subscriptions for Event          (registration order)
//!     └─▶ subscriptions for Announcement   (registration order)
//! ```
//!
//! The most specific kind is served first. A subscription to a kind set is
//! placed by its closest matching member and runs once.
//!
//! ## Locking
//!
//! One `RwLock` guards the registry. Dispatch snapshots the matching
//! subscriptions under a read lock and delivers with the lock released, so
//! handlers may subscribe, unsubscribe or announce on the same announcer.
//! Such changes apply from the next `announce`.

use crate::announcement::Announcement;
use crate::config::{AnnouncerConfig, FaultPolicy};
use crate::error::{AnnounceError, AnnouncerError, HandlerFault};
use crate::handler::{Delivery, Handler, Outcome, ReceiverId};
use crate::kind::{Kind, KindSet};
use crate::subscriber::{
    Resolved, Strength, Subscription, SubscriptionHandle, SubscriptionRegistry,
};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Registry of subscriptions and dispatcher of announcements.
pub struct Announcer {
    config: AnnouncerConfig,
    registry: RwLock<SubscriptionRegistry>,
}

impl Announcer {
    /// Create an announcer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AnnouncerConfig::default(),
            registry: RwLock::new(SubscriptionRegistry::default()),
        }
    }

    /// Create an announcer with a validated configuration.
    pub fn with_config(config: AnnouncerConfig) -> Result<Self, AnnouncerError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: RwLock::new(SubscriptionRegistry::default()),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn config(&self) -> &AnnouncerConfig {
        &self.config
    }

    /// Register `handler` for announcements of `kinds` (and their
    /// descendants).
    ///
    /// # Errors
    ///
    /// - [`AnnouncerError::InvalidHandler`] if the handler declares more
    ///   than two arguments
    /// - [`AnnouncerError::EmptyKindSet`] if `kinds` is empty
    pub fn subscribe(
        &self,
        kinds: impl Into<KindSet>,
        handler: Handler,
    ) -> Result<SubscriptionHandle, AnnouncerError> {
        let kinds = kinds.into();
        if kinds.is_empty() {
            return Err(AnnouncerError::EmptyKindSet);
        }
        let arity = handler.arity()?;
        let (receiver, invoke) = handler.into_parts();

        let handle = {
            let mut registry = self.registry.write();
            registry.prune();
            registry.add(Subscription::new(kinds, arity, receiver, invoke))
        };

        debug!(
            announcer = %self.config.name,
            subscription = %handle.id(),
            kinds = %handle.kinds(),
            arity = ?arity,
            "Subscription created"
        );

        Ok(handle)
    }

    /// Shorthand for subscribing a one-argument closure.
    pub fn on<F, R>(&self, kind: &'static Kind, handler: F) -> Result<SubscriptionHandle, AnnouncerError>
    where
        F: Fn(&Announcement) -> R + Send + Sync + 'static,
        R: Outcome,
    {
        self.subscribe(kind, Handler::event(handler))
    }

    /// Remove exactly the subscription behind `handle`.
    ///
    /// # Errors
    ///
    /// [`AnnouncerError::NotSubscribed`] if it is not registered here, or if
    /// it was weak and its receiver has been dropped.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<(), AnnouncerError> {
        let removed = {
            let mut registry = self.registry.write();
            registry.prune();
            registry.remove(handle.id())
        };
        match removed {
            Some(subscription) => {
                debug!(
                    announcer = %self.config.name,
                    subscription = %subscription.id(),
                    "Subscription removed"
                );
                Ok(())
            }
            None => Err(AnnouncerError::NotSubscribed(handle.id())),
        }
    }

    /// Remove every subscription bound to `receiver`. Returns how many were
    /// removed.
    pub fn unsubscribe_receiver<T: ?Sized>(&self, receiver: &Arc<T>) -> usize {
        let removed = self
            .registry
            .write()
            .remove_receiver(ReceiverId::of(receiver));
        debug!(
            announcer = %self.config.name,
            removed,
            "Receiver unsubscribed"
        );
        removed
    }

    /// Handles of the live subscriptions bound to `receiver`.
    #[must_use]
    pub fn subscriptions_of<T: ?Sized>(&self, receiver: &Arc<T>) -> Vec<SubscriptionHandle> {
        self.registry.read().handles_of(ReceiverId::of(receiver))
    }

    /// Swap the handler of an existing subscription, keeping its id, kinds,
    /// position and receiver strength.
    ///
    /// # Errors
    ///
    /// - [`AnnouncerError::InvalidHandler`] for an invalid arity
    /// - [`AnnouncerError::NotSubscribed`] if the handle is not registered
    pub fn replace(
        &self,
        handle: &SubscriptionHandle,
        handler: Handler,
    ) -> Result<SubscriptionHandle, AnnouncerError> {
        let arity = handler.arity()?;
        let (receiver, invoke) = handler.into_parts();

        let mut registry = self.registry.write();
        let subscription = registry
            .get_mut(handle.id())
            .ok_or(AnnouncerError::NotSubscribed(handle.id()))?;
        subscription.replace(arity, receiver, invoke);

        debug!(
            announcer = %self.config.name,
            subscription = %handle.id(),
            arity = ?arity,
            "Subscription replaced"
        );
        Ok(subscription.handle())
    }

    /// Stop keeping the subscription's receiver alive. Once the receiver is
    /// dropped, the subscription no longer counts, is never delivered to and
    /// is removed by the next `subscribe`, `unsubscribe` or `announce`.
    ///
    /// # Errors
    ///
    /// - [`AnnouncerError::NotSubscribed`] if the handle is not registered
    /// - [`AnnouncerError::NoReceiver`] for closure handlers
    pub fn make_weak(&self, handle: &SubscriptionHandle) -> Result<(), AnnouncerError> {
        self.set_strength(handle, Strength::Weak)
    }

    /// Hold the subscription's receiver strongly again.
    ///
    /// # Errors
    ///
    /// As [`make_weak`](Self::make_weak); a weak subscription whose receiver
    /// is already gone counts as not subscribed.
    pub fn make_strong(&self, handle: &SubscriptionHandle) -> Result<(), AnnouncerError> {
        self.set_strength(handle, Strength::Strong)
    }

    /// Current receiver strength, `None` for closure handlers.
    ///
    /// # Errors
    ///
    /// [`AnnouncerError::NotSubscribed`] if the handle is not registered.
    pub fn strength(&self, handle: &SubscriptionHandle) -> Result<Option<Strength>, AnnouncerError> {
        self.registry
            .read()
            .get(handle.id())
            .map(Subscription::strength)
            .ok_or(AnnouncerError::NotSubscribed(handle.id()))
    }

    /// Live subscriptions. Weak ones whose receiver was dropped are not
    /// counted.
    #[must_use]
    pub fn number_of_subscriptions(&self) -> usize {
        self.registry.read().len()
    }

    #[must_use]
    pub fn has_subscriptions(&self) -> bool {
        self.number_of_subscriptions() > 0
    }

    /// Drop every subscription.
    pub fn reset(&self) {
        self.registry.write().clear();
        debug!(announcer = %self.config.name, "Subscriptions reset");
    }

    /// Deliver `announcement` to every matching subscription.
    ///
    /// Accepts an [`Announcement`] or a bare `&'static Kind`, which is turned
    /// into an attribute-free instance.
    ///
    /// # Returns
    ///
    /// The delivered announcement, including any attributes handlers set.
    ///
    /// # Errors
    ///
    /// [`AnnounceError::HandlersFailed`] if any handler failed. Under
    /// [`FaultPolicy::DeliverAll`] every other handler still ran; under
    /// [`FaultPolicy::FailFast`] delivery stopped at the first fault.
    pub fn announce(
        &self,
        announcement: impl Into<Announcement>,
    ) -> Result<Announcement, AnnounceError> {
        let announcement = announcement.into();
        let kind = announcement.kind();
        let targets = self.registry.read().matching(kind);

        let mut delivered = 0_usize;
        let mut dropped = 0_usize;
        let mut faults = Vec::new();
        {
            let delivery = Delivery {
                announcement: &announcement,
                announcer: self,
            };

            for target in &targets {
                let receiver = match target.resolve() {
                    Resolved::Unbound => None,
                    Resolved::Live(receiver) => Some(receiver),
                    Resolved::Dropped => {
                        dropped += 1;
                        continue;
                    }
                };

                trace!(
                    announcer = %self.config.name,
                    kind = %kind,
                    subscription = %target.id,
                    distance = target.distance,
                    "Delivering announcement"
                );

                delivered += 1;
                if let Err(error) = target.invoke(receiver.as_deref(), &delivery) {
                    faults.push(HandlerFault {
                        subscription: target.id,
                        error,
                    });
                    if self.config.fault_policy == FaultPolicy::FailFast {
                        break;
                    }
                }
            }
        }

        // Dead weak subscriptions of unrelated kinds are collected here too.
        let has_dropped = dropped > 0 || self.registry.read().has_dropped();
        if has_dropped {
            let pruned = self.registry.write().prune();
            debug!(
                announcer = %self.config.name,
                pruned,
                "Pruned subscriptions whose receiver was dropped"
            );
        }

        debug!(
            announcer = %self.config.name,
            kind = %kind,
            receivers = delivered,
            faults = faults.len(),
            "Announcement delivered"
        );

        if faults.is_empty() {
            Ok(announcement)
        } else {
            Err(AnnounceError::HandlersFailed {
                kind: kind.name(),
                faults,
            })
        }
    }

    fn set_strength(
        &self,
        handle: &SubscriptionHandle,
        strength: Strength,
    ) -> Result<(), AnnouncerError> {
        let mut registry = self.registry.write();
        registry.prune();
        let subscription = registry
            .get_mut(handle.id())
            .ok_or(AnnouncerError::NotSubscribed(handle.id()))?;
        subscription
            .set_strength(strength)
            .ok_or(AnnouncerError::NoReceiver(handle.id()))?;

        debug!(
            announcer = %self.config.name,
            subscription = %handle.id(),
            strength = ?strength,
            "Subscription strength changed"
        );
        Ok(())
    }
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcer")
            .field("name", &self.config.name)
            .field("fault_policy", &self.config.fault_policy)
            .field("subscriptions", &self.number_of_subscriptions())
            .finish()
    }
}

impl fmt::Display for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Announcer({})", self.config.name)
    }
}
