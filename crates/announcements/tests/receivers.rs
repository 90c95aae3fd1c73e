//! # Receiver Tests
//!
//! Receiver-bound (`send`) handlers, weak subscriptions and the
//! announcement spy.

use announcements::{
    Announcement, AnnouncementSpy, Announcer, AnnouncerError, Handler, Kind, Strength,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static CLICKED: Kind = Kind::root("Clicked");
static DOUBLE_CLICKED: Kind = Kind::child("DoubleClicked", &CLICKED);
static CLOSED: Kind = Kind::root("Closed");

#[derive(Default)]
struct Window {
    clicks: AtomicUsize,
    closes: AtomicUsize,
}

impl Window {
    fn on_click(&self, _: &Announcement) {
        self.clicks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_double_click(&self, event: &Announcement, announcer: &Announcer) -> Result<(), anyhow::Error> {
        self.clicks.fetch_add(2, Ordering::SeqCst);
        event.set("handled_by", announcer.name());
        Ok(())
    }

    fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }
}

fn init() {
    announcements_telemetry::init_test_logging().expect("valid test log filter");
}

// =============================================================================
// SEND HANDLERS
// =============================================================================

#[test]
fn test_send_handlers_call_methods() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());

    announcer
        .subscribe(&CLICKED, Handler::send(&window, Window::on_click))
        .unwrap();
    announcer
        .subscribe(&CLOSED, Handler::send_action(&window, Window::on_close))
        .unwrap();

    announcer.announce(&CLICKED).unwrap();
    announcer.announce(&CLOSED).unwrap();

    assert_eq!(window.clicks(), 1);
    assert_eq!(window.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_send_with_announcer_mutates_announcement() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());
    announcer
        .subscribe(
            &DOUBLE_CLICKED,
            Handler::send_with_announcer(&window, Window::on_double_click),
        )
        .unwrap();

    let announcement = announcer.announce(&DOUBLE_CLICKED).unwrap();

    assert_eq!(window.clicks(), 2);
    assert_eq!(
        announcement.try_get::<String>("handled_by").unwrap(),
        "announcer"
    );
}

#[test]
fn test_unsubscribe_receiver_removes_all_its_subscriptions() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());
    let other = Arc::new(Window::default());

    announcer
        .subscribe(&CLICKED, Handler::send(&window, Window::on_click))
        .unwrap();
    announcer
        .subscribe(&CLOSED, Handler::send_action(&window, Window::on_close))
        .unwrap();
    announcer
        .subscribe(&CLICKED, Handler::send(&other, Window::on_click))
        .unwrap();
    assert_eq!(announcer.subscriptions_of(&window).len(), 2);

    assert_eq!(announcer.unsubscribe_receiver(&window), 2);
    announcer.announce(&CLICKED).unwrap();

    assert_eq!(window.clicks(), 0);
    assert_eq!(other.clicks(), 1);
    assert!(announcer.subscriptions_of(&window).is_empty());
    assert_eq!(announcer.unsubscribe_receiver(&window), 0);
}

#[test]
fn test_strong_subscription_keeps_receiver_alive() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());
    let handle = announcer
        .subscribe(&CLICKED, Handler::send(&window, Window::on_click))
        .unwrap();
    assert_eq!(announcer.strength(&handle).unwrap(), Some(Strength::Strong));
    assert_eq!(Arc::strong_count(&window), 2);

    drop(window);
    announcer.announce(&CLICKED).unwrap();

    assert_eq!(announcer.number_of_subscriptions(), 1);
}

// =============================================================================
// WEAK SUBSCRIPTIONS
// =============================================================================

#[test]
fn test_weak_subscription_dies_with_receiver() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());
    let handle = announcer
        .subscribe(&CLICKED, Handler::send(&window, Window::on_click))
        .unwrap();

    announcer.make_weak(&handle).unwrap();
    assert_eq!(announcer.strength(&handle).unwrap(), Some(Strength::Weak));
    assert_eq!(Arc::strong_count(&window), 1);

    announcer.announce(&CLICKED).unwrap();
    assert_eq!(window.clicks(), 1);

    drop(window);
    announcer.announce(&CLICKED).unwrap();

    assert_eq!(announcer.number_of_subscriptions(), 0);
    assert_eq!(
        announcer.unsubscribe(&handle).unwrap_err(),
        AnnouncerError::NotSubscribed(handle.id())
    );
}

#[test]
fn test_dropped_weak_receiver_not_counted_before_matching_announce() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());
    let handle = announcer
        .subscribe(&CLICKED, Handler::send(&window, Window::on_click))
        .unwrap();
    announcer.make_weak(&handle).unwrap();

    drop(window);
    assert_eq!(announcer.number_of_subscriptions(), 0);
    assert!(!announcer.has_subscriptions());

    for _ in 0..100 {
        announcer.announce(&CLOSED).unwrap();
    }
    assert_eq!(announcer.number_of_subscriptions(), 0);
    assert_eq!(
        announcer.unsubscribe(&handle).unwrap_err(),
        AnnouncerError::NotSubscribed(handle.id())
    );
}

#[test]
fn test_dropped_spy_leaves_no_subscription() {
    init();
    let announcer = Announcer::new();
    let spy = AnnouncementSpy::attach(&announcer).unwrap();
    assert!(announcer.has_subscriptions());

    drop(spy);

    assert!(!announcer.has_subscriptions());
}

#[test]
fn test_make_strong_restores_ownership() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());
    let handle = announcer
        .subscribe(&CLICKED, Handler::send(&window, Window::on_click))
        .unwrap();

    announcer.make_weak(&handle).unwrap();
    announcer.make_strong(&handle).unwrap();
    assert_eq!(Arc::strong_count(&window), 2);

    drop(window);
    announcer.announce(&CLICKED).unwrap();
    assert_eq!(announcer.number_of_subscriptions(), 1);
}

#[test]
fn test_make_strong_after_receiver_dropped() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());
    let handle = announcer
        .subscribe(&CLICKED, Handler::send(&window, Window::on_click))
        .unwrap();
    announcer.make_weak(&handle).unwrap();
    drop(window);

    assert_eq!(
        announcer.make_strong(&handle).unwrap_err(),
        AnnouncerError::NotSubscribed(handle.id())
    );
}

#[test]
fn test_replace_keeps_weak_strength() {
    init();
    let announcer = Announcer::new();
    let window = Arc::new(Window::default());
    let handle = announcer
        .subscribe(&CLICKED, Handler::send(&window, Window::on_click))
        .unwrap();
    announcer.make_weak(&handle).unwrap();

    announcer
        .replace(&handle, Handler::send(&window, |window: &Window, _: &Announcement| {
            window.clicks.fetch_add(10, Ordering::SeqCst);
        }))
        .unwrap();
    assert_eq!(announcer.strength(&handle).unwrap(), Some(Strength::Weak));

    announcer.announce(&CLICKED).unwrap();
    assert_eq!(window.clicks(), 10);
}

// =============================================================================
// SPY
// =============================================================================

#[test]
fn test_spy_sees_nested_announcements_in_order() {
    init();
    let announcer = Announcer::new();
    let spy = AnnouncementSpy::attach(&announcer).unwrap();
    announcer
        .subscribe(
            &CLICKED,
            Handler::event_announcer(|_: &Announcement, announcer: &Announcer| {
                announcer.announce(&CLOSED).map(|_| ())
            }),
        )
        .unwrap();

    announcer
        .announce(Announcement::new(&DOUBLE_CLICKED).with("x", 3))
        .unwrap();

    let kinds: Vec<_> = spy.announcements().into_iter().map(|seen| seen.kind).collect();
    // The clicked handler is more specific than the spy's root subscription,
    // so the nested announcement is recorded first.
    assert_eq!(kinds, vec!["Closed", "DoubleClicked"]);

    let json = serde_json::to_value(&spy.announcements()[1]).unwrap();
    assert_eq!(json["attributes"]["x"], 3);
}

#[test]
fn test_spy_counts_as_receiver_subscription() {
    init();
    let announcer = Announcer::new();
    let spy = AnnouncementSpy::attach(&announcer).unwrap();

    assert_eq!(announcer.subscriptions_of(&spy).len(), 1);
    assert_eq!(spy.detach(&announcer), 1);
    assert!(!announcer.has_subscriptions());
}
