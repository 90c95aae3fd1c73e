//! # Subscriptions
//!
//! The registry side of the announcer: subscription records, the handles
//! returned to callers, and the ordered registry that owns them.

use crate::handler::{Arity, Delivery, Invoke, Receiver, ReceiverId};
use crate::kind::{Kind, KindSet};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Unique identifier of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe or reconfigure the
/// subscription later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    kinds: KindSet,
    arity: Arity,
}

impl SubscriptionHandle {
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    #[must_use]
    pub fn kinds(&self) -> &KindSet {
        &self.kinds
    }

    #[must_use]
    pub fn arity(&self) -> Arity {
        self.arity
    }
}

/// How a subscription holds its receiver object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    /// Keeps the receiver alive.
    Strong,
    /// Does not keep the receiver alive; the subscription goes away with it.
    Weak,
}

#[derive(Clone)]
pub(crate) enum ReceiverSlot {
    Strong(Receiver),
    Weak(Weak<dyn Any + Send + Sync>),
}

/// Result of looking up a subscription's receiver at delivery time.
pub(crate) enum Resolved {
    Unbound,
    Live(Receiver),
    Dropped,
}

impl ReceiverSlot {
    fn strength(&self) -> Strength {
        match self {
            Self::Strong(_) => Strength::Strong,
            Self::Weak(_) => Strength::Weak,
        }
    }

    fn resolve(&self) -> Resolved {
        match self {
            Self::Strong(receiver) => Resolved::Live(Arc::clone(receiver)),
            Self::Weak(receiver) => receiver
                .upgrade()
                .map_or(Resolved::Dropped, Resolved::Live),
        }
    }

    fn is_dropped(&self) -> bool {
        matches!(self, Self::Weak(receiver) if receiver.strong_count() == 0)
    }

    fn with_strength(self, strength: Strength) -> Option<Self> {
        match (self, strength) {
            (Self::Strong(receiver), Strength::Weak) => Some(Self::Weak(Arc::downgrade(&receiver))),
            (Self::Weak(receiver), Strength::Strong) => receiver.upgrade().map(Self::Strong),
            (slot, _) => Some(slot),
        }
    }
}

/// A registered (kinds, handler, arity) binding.
pub(crate) struct Subscription {
    id: SubscriptionId,
    kinds: KindSet,
    arity: Arity,
    invoke: Arc<Invoke>,
    receiver: Option<(ReceiverId, ReceiverSlot)>,
}

impl Subscription {
    pub(crate) fn new(
        kinds: KindSet,
        arity: Arity,
        receiver: Option<Receiver>,
        invoke: Arc<Invoke>,
    ) -> Self {
        Self {
            id: SubscriptionId::new(),
            kinds,
            arity,
            invoke,
            receiver: receiver.map(|object| (ReceiverId::of(&object), ReceiverSlot::Strong(object))),
        }
    }

    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    pub(crate) fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle {
            id: self.id,
            kinds: self.kinds.clone(),
            arity: self.arity,
        }
    }

    pub(crate) fn strength(&self) -> Option<Strength> {
        self.receiver.as_ref().map(|(_, slot)| slot.strength())
    }

    fn is_dropped(&self) -> bool {
        matches!(&self.receiver, Some((_, slot)) if slot.is_dropped())
    }

    fn is_bound_to(&self, receiver: ReceiverId) -> bool {
        matches!(&self.receiver, Some((id, slot)) if *id == receiver && !slot.is_dropped())
    }

    fn target(&self, distance: usize, sequence: usize) -> Target {
        Target {
            id: self.id,
            distance,
            sequence,
            invoke: Arc::clone(&self.invoke),
            receiver: self.receiver.as_ref().map(|(_, slot)| slot.clone()),
        }
    }
}

/// Snapshot of one matching subscription, delivered outside the lock.
pub(crate) struct Target {
    pub id: SubscriptionId,
    pub distance: usize,
    sequence: usize,
    invoke: Arc<Invoke>,
    receiver: Option<ReceiverSlot>,
}

impl Target {
    pub(crate) fn resolve(&self) -> Resolved {
        self.receiver
            .as_ref()
            .map_or(Resolved::Unbound, ReceiverSlot::resolve)
    }

    pub(crate) fn invoke(
        &self,
        receiver: Option<&(dyn Any + Send + Sync)>,
        delivery: &Delivery<'_>,
    ) -> anyhow::Result<()> {
        (self.invoke)(receiver, delivery)
    }
}

/// Insertion-ordered subscription storage owned by one announcer.
#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionRegistry {
    /// Live subscriptions. Weak ones whose receiver is gone are not counted,
    /// even before they are pruned.
    pub(crate) fn len(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|subscription| !subscription.is_dropped())
            .count()
    }

    pub(crate) fn has_dropped(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_dropped)
    }

    pub(crate) fn add(&mut self, subscription: Subscription) -> SubscriptionHandle {
        let handle = subscription.handle();
        self.subscriptions.push(subscription);
        handle
    }

    pub(crate) fn get(&self, id: SubscriptionId) -> Option<&Subscription> {
        self.subscriptions
            .iter()
            .find(|subscription| subscription.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: SubscriptionId) -> Option<&mut Subscription> {
        self.subscriptions
            .iter_mut()
            .find(|subscription| subscription.id == id)
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> Option<Subscription> {
        let index = self
            .subscriptions
            .iter()
            .position(|subscription| subscription.id == id)?;
        Some(self.subscriptions.remove(index))
    }

    /// Remove every subscription bound to `receiver`; returns how many.
    pub(crate) fn remove_receiver(&mut self, receiver: ReceiverId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|subscription| !subscription.is_bound_to(receiver));
        before - self.subscriptions.len()
    }

    pub(crate) fn handles_of(&self, receiver: ReceiverId) -> Vec<SubscriptionHandle> {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.is_bound_to(receiver))
            .map(Subscription::handle)
            .collect()
    }

    /// Remove weak subscriptions whose receiver is gone; returns how many.
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|subscription| !subscription.is_dropped());
        before - self.subscriptions.len()
    }

    pub(crate) fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// Subscriptions matching `kind`, most specific kind first, then in
    /// registration order.
    pub(crate) fn matching(&self, kind: &Kind) -> Vec<Target> {
        let mut targets: Vec<Target> = self
            .subscriptions
            .iter()
            .enumerate()
            .filter_map(|(sequence, subscription)| {
                subscription
                    .kinds
                    .distance_to(kind)
                    .map(|distance| subscription.target(distance, sequence))
            })
            .collect();
        targets.sort_by_key(|target| (target.distance, target.sequence));
        targets
    }
}

impl Subscription {
    /// Swap the callable, keeping id, kinds, position and receiver strength.
    pub(crate) fn replace(&mut self, arity: Arity, receiver: Option<Receiver>, invoke: Arc<Invoke>) {
        let strength = self.strength().unwrap_or(Strength::Strong);
        self.arity = arity;
        self.invoke = invoke;
        self.receiver = receiver.and_then(|object| {
            let id = ReceiverId::of(&object);
            ReceiverSlot::Strong(object)
                .with_strength(strength)
                .map(|slot| (id, slot))
        });
    }

    /// Switch how the receiver is held. Returns `None` without a receiver.
    pub(crate) fn set_strength(&mut self, strength: Strength) -> Option<()> {
        let (id, slot) = self.receiver.take()?;
        match slot.clone().with_strength(strength) {
            Some(updated) => self.receiver = Some((id, updated)),
            None => self.receiver = Some((id, slot)),
        }
        Some(())
    }
}
