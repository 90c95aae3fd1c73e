//! # Announcements
//!
//! An [`Announcement`] is an instance of a [`Kind`] carrying free-form named
//! attributes. Construction takes only the kind; data is attached
//! afterwards:
//!
//! ```rust
//! use announcements::{Announcement, Kind};
//!
//! static BUTTON_CLICKED: Kind = Kind::root("ButtonClicked");
//!
//! let clicked = Announcement::new(&BUTTON_CLICKED);
//! clicked.set("button", "ok");
//! clicked.set("clicks", 2);
//!
//! assert_eq!(clicked.try_get::<u32>("clicks").unwrap(), 2);
//! ```
//!
//! Attributes sit behind a lock so handlers can update them while the
//! announcement is being delivered.

use crate::error::AttributeError;
use crate::kind::Kind;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute bag of an announcement.
pub type Attributes = BTreeMap<String, Value>;

/// A typed event value broadcast by an [`Announcer`](crate::Announcer).
pub struct Announcement {
    kind: &'static Kind,
    attributes: RwLock<Attributes>,
}

impl Announcement {
    #[must_use]
    pub fn new(kind: &'static Kind) -> Self {
        Self {
            kind,
            attributes: RwLock::new(Attributes::new()),
        }
    }

    /// Builder-style attribute assignment.
    #[must_use]
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn kind(&self) -> &'static Kind {
        self.kind
    }

    /// Whether this announcement is of `kind` or one of its descendants.
    #[must_use]
    pub fn is_a(&self, kind: &Kind) -> bool {
        kind.handles(self.kind)
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.write().insert(name.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attributes.read().get(name).cloned()
    }

    /// Read an attribute as `T`.
    ///
    /// # Errors
    ///
    /// - [`AttributeError::Missing`] if the attribute was never set
    /// - [`AttributeError::Invalid`] if it does not deserialize as `T`
    pub fn try_get<T: DeserializeOwned>(&self, name: &str) -> Result<T, AttributeError> {
        let value = self
            .get(name)
            .ok_or_else(|| AttributeError::Missing(name.to_string()))?;
        serde_json::from_value(value).map_err(|source| AttributeError::Invalid {
            name: name.to_string(),
            source,
        })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.read().contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.attributes.write().remove(name)
    }

    /// Snapshot of all attributes.
    #[must_use]
    pub fn attributes(&self) -> Attributes {
        self.attributes.read().clone()
    }
}

impl From<&'static Kind> for Announcement {
    fn from(kind: &'static Kind) -> Self {
        Self::new(kind)
    }
}

impl Clone for Announcement {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            attributes: RwLock::new(self.attributes()),
        }
    }
}

impl fmt::Debug for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcement")
            .field("kind", &self.kind.name())
            .field("attributes", &*self.attributes.read())
            .finish()
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        let attributes = self.attributes.read();
        if !attributes.is_empty() {
            let rendered = serde_json::to_string(&*attributes).map_err(|_| fmt::Error)?;
            write!(f, " {rendered}")?;
        }
        Ok(())
    }
}

impl Serialize for Announcement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Announcement", 2)?;
        state.serialize_field("kind", self.kind.name())?;
        state.serialize_field("attributes", &*self.attributes.read())?;
        state.end()
    }
}
