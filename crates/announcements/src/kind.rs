//! # Announcement Kinds
//!
//! A [`Kind`] is the type tag of an announcement. Every kind names its
//! parent explicitly, so matching walks a declared ancestor chain:
//!
//! ```text
//! ChildEvent ──▶ Event ──▶ Announcement (universal root)
//! ```
//!
//! A subscription for `Event` therefore also receives `ChildEvent`
//! announcements. Kinds are meant to be declared as `static` items:
//!
//! ```rust
//! use announcements::Kind;
//!
//! static EVENT: Kind = Kind::root("Event");
//! static CHILD_EVENT: Kind = Kind::child("ChildEvent", &EVENT);
//!
//! assert!(EVENT.handles(&CHILD_EVENT));
//! assert!(!CHILD_EVENT.handles(&EVENT));
//! ```
//!
//! A [`KindSet`] groups several kinds behind one subscription. It is built
//! with `+`, and duplicates collapse:
//!
//! ```rust
//! use announcements::{Kind, KindSet};
//!
//! static A: Kind = Kind::root("A");
//! static B: Kind = Kind::root("B");
//!
//! let set: KindSet = &A + &B + &A;
//! assert_eq!(set.len(), 2);
//! ```

use std::fmt;
use std::ops::Add;

/// Type tag of an announcement, with an explicit parent chain.
///
/// Equality is structural: two kinds are the same kind when their names
/// and parent chains match, wherever they are declared. Names must
/// therefore be unique among the children of one parent.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind {
    name: &'static str,
    parent: Option<&'static Kind>,
}

impl Kind {
    /// The universal root. Every kind descends from it, so subscribing to it
    /// receives every announcement.
    pub const ANNOUNCEMENT: Kind = Kind {
        name: "Announcement",
        parent: None,
    };

    /// Declare a top-level kind (its parent is [`Kind::ANNOUNCEMENT`]).
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self {
            name,
            parent: Some(&Kind::ANNOUNCEMENT),
        }
    }

    /// Declare a kind specializing `parent`.
    #[must_use]
    pub const fn child(name: &'static str, parent: &'static Kind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn parent(&self) -> Option<&'static Kind> {
        self.parent
    }

    /// This kind followed by each of its ancestors, ending at the universal
    /// root.
    pub fn lineage(&self) -> Lineage<'_> {
        Lineage { next: Some(self) }
    }

    /// Number of steps between this kind and the universal root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.lineage().count() - 1
    }

    /// Whether an announcement of `kind` is delivered to a subscription for
    /// this kind, i.e. `kind` is this kind or one of its descendants.
    #[must_use]
    pub fn handles(&self, kind: &Kind) -> bool {
        self.distance_to(kind).is_some()
    }

    /// Steps from `kind` up to this kind, if this kind is in its lineage.
    pub(crate) fn distance_to(&self, kind: &Kind) -> Option<usize> {
        kind.lineage().position(|ancestor| ancestor == self)
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Kind(")?;
        for (index, kind) in self.lineage().enumerate() {
            if index > 0 {
                f.write_str(" < ")?;
            }
            f.write_str(kind.name)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a kind and its ancestors. See [`Kind::lineage`].
#[derive(Debug, Clone)]
pub struct Lineage<'a> {
    next: Option<&'a Kind>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a Kind;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

/// Set of kinds one subscription listens to.
///
/// Keeps insertion order for display; membership ignores duplicates.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KindSet {
    kinds: Vec<&'static Kind>,
}

impl KindSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind. Returns `false` if it was already present.
    pub fn insert(&mut self, kind: &'static Kind) -> bool {
        if self.contains(kind) {
            return false;
        }
        self.kinds.push(kind);
        true
    }

    #[must_use]
    pub fn contains(&self, kind: &Kind) -> bool {
        self.kinds.iter().any(|member| *member == kind)
    }

    /// Whether any member handles announcements of `kind`.
    #[must_use]
    pub fn handles(&self, kind: &Kind) -> bool {
        self.kinds.iter().any(|member| member.handles(kind))
    }

    /// Smallest distance from `kind` to a member, i.e. how specific the
    /// closest match is (0 = exact kind).
    pub(crate) fn distance_to(&self, kind: &Kind) -> Option<usize> {
        self.kinds
            .iter()
            .filter_map(|member| member.distance_to(kind))
            .min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Kind> + '_ {
        self.kinds.iter().copied()
    }
}

impl From<&'static Kind> for KindSet {
    fn from(kind: &'static Kind) -> Self {
        Self { kinds: vec![kind] }
    }
}

impl FromIterator<&'static Kind> for KindSet {
    fn from_iter<I: IntoIterator<Item = &'static Kind>>(iter: I) -> Self {
        let mut set = Self::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl Add<&'static Kind> for KindSet {
    type Output = KindSet;

    fn add(mut self, kind: &'static Kind) -> KindSet {
        self.insert(kind);
        self
    }
}

impl Add<&'static Kind> for &'static Kind {
    type Output = KindSet;

    fn add(self, kind: &'static Kind) -> KindSet {
        KindSet::from(self) + kind
    }
}

impl fmt::Debug for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KindSet")
            .field(&format_args!("{}", self))
            .finish()
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, kind) in self.kinds.iter().enumerate() {
            if index > 0 {
                f.write_str(" + ")?;
            }
            f.write_str(kind.name)?;
        }
        Ok(())
    }
}
