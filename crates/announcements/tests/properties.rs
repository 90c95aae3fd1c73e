//! Property tests for dispatch order and unsubscribe isolation.

use announcements::{Announcer, Handler, Kind};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

static EVENT: Kind = Kind::root("Event");
static CHILD_EVENT: Kind = Kind::child("ChildEvent", &EVENT);

fn subscribe_labelled(
    announcer: &Announcer,
    kind: &'static Kind,
    log: &Arc<Mutex<Vec<usize>>>,
    label: usize,
) -> announcements::SubscriptionHandle {
    let log = Arc::clone(log);
    announcer
        .subscribe(kind, Handler::action(move || log.lock().push(label)))
        .unwrap()
}

proptest! {
    #[test]
    fn prop_same_kind_dispatch_is_fifo(count in 1usize..40) {
        let announcer = Announcer::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for label in 0..count {
            subscribe_labelled(&announcer, &EVENT, &log, label);
        }

        announcer.announce(&EVENT).unwrap();

        let expected: Vec<usize> = (0..count).collect();
        prop_assert_eq!(log.lock().clone(), expected);
    }

    #[test]
    fn prop_specific_kind_first_then_fifo(kinds in prop::collection::vec(any::<bool>(), 1..40)) {
        let announcer = Announcer::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for (label, child) in kinds.iter().enumerate() {
            let kind = if *child { &CHILD_EVENT } else { &EVENT };
            subscribe_labelled(&announcer, kind, &log, label);
        }

        announcer.announce(&CHILD_EVENT).unwrap();

        let children = kinds.iter().enumerate().filter(|(_, child)| **child).map(|(label, _)| label);
        let parents = kinds.iter().enumerate().filter(|(_, child)| !**child).map(|(label, _)| label);
        let expected: Vec<usize> = children.chain(parents).collect();
        prop_assert_eq!(log.lock().clone(), expected);
    }

    #[test]
    fn prop_unsubscribe_leaves_others_untouched(
        removed in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        let announcer = Announcer::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..removed.len())
            .map(|label| subscribe_labelled(&announcer, &EVENT, &log, label))
            .collect();

        for (handle, remove) in handles.iter().zip(&removed) {
            if *remove {
                announcer.unsubscribe(handle).unwrap();
            }
        }
        announcer.announce(&EVENT).unwrap();

        let expected: Vec<usize> = removed
            .iter()
            .enumerate()
            .filter(|(_, remove)| !**remove)
            .map(|(label, _)| label)
            .collect();
        prop_assert_eq!(announcer.number_of_subscriptions(), expected.len());
        prop_assert_eq!(log.lock().clone(), expected);
    }
}
