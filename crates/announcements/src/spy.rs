//! # Announcement Spy
//!
//! Records and logs every announcement an announcer delivers. The spy
//! subscribes weakly to [`Kind::ANNOUNCEMENT`], so dropping the last handle to
//! it removes the subscription on the next announcement.

use crate::announcement::{Announcement, Attributes};
use crate::error::AnnouncerError;
use crate::handler::Handler;
use crate::kind::Kind;
use crate::publisher::Announcer;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// What the spy keeps of one announcement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observed {
    pub kind: &'static str,
    pub attributes: Attributes,
}

/// Logs every announcement seen by one announcer.
#[derive(Debug)]
pub struct AnnouncementSpy {
    announcer: String,
    observed: Mutex<Vec<Observed>>,
}

impl AnnouncementSpy {
    /// Create a spy and attach it to `announcer`.
    pub fn attach(announcer: &Announcer) -> Result<Arc<Self>, AnnouncerError> {
        let spy = Arc::new(Self {
            announcer: announcer.name().to_string(),
            observed: Mutex::new(Vec::new()),
        });
        let handle = announcer.subscribe(&Kind::ANNOUNCEMENT, Handler::send(&spy, Self::record))?;
        announcer.make_weak(&handle)?;
        Ok(spy)
    }

    /// Remove this spy's subscriptions from `announcer`.
    pub fn detach(self: &Arc<Self>, announcer: &Announcer) -> usize {
        announcer.unsubscribe_receiver(self)
    }

    fn record(&self, announcement: &Announcement) {
        info!(
            announcer = %self.announcer,
            kind = %announcement.kind(),
            announcement = %announcement,
            "Incoming announcement"
        );
        self.observed.lock().push(Observed {
            kind: announcement.kind().name(),
            attributes: announcement.attributes(),
        });
    }

    /// Everything recorded so far, oldest first.
    #[must_use]
    pub fn announcements(&self) -> Vec<Observed> {
        self.observed.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observed.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observed.lock().is_empty()
    }

    pub fn clear(&self) {
        self.observed.lock().clear();
    }
}
