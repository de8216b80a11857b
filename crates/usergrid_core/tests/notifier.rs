use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;

use usergrid_core::{AmbientFlags, StateNotifier, SubscriptionHandle};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(usergrid_logging::initialize_for_tests);
}

fn counter() -> (Rc<Cell<u32>>, impl Fn() + Clone + 'static) {
    let hits = Rc::new(Cell::new(0));
    let inner = hits.clone();
    (hits, move || inner.set(inner.get() + 1))
}

#[test]
fn defaults_to_not_loading() {
    let notifier = StateNotifier::new();
    assert!(!notifier.is_loading());
    assert_eq!(notifier.flags(), AmbientFlags::default());
    assert_eq!(notifier.subscriber_count(), 0);
}

#[test]
fn repeated_value_notifies_once() {
    init_logging();
    let notifier = StateNotifier::new();
    let (hits, callback) = counter();
    let _handle = notifier.subscribe(callback);

    notifier.set_loading(true);
    notifier.set_loading(true);
    assert_eq!(hits.get(), 1);

    notifier.set_loading(false);
    assert_eq!(hits.get(), 2);
}

#[test]
fn writing_the_default_value_is_silent() {
    let notifier = StateNotifier::new();
    let (hits, callback) = counter();
    let _handle = notifier.subscribe(callback);

    notifier.set_loading(false);
    assert_eq!(hits.get(), 0);
    assert!(!notifier.is_loading());
}

#[test]
fn notifications_match_value_changes_over_a_sequence() {
    let notifier = StateNotifier::new();
    let (hits, callback) = counter();
    let _handle = notifier.subscribe(callback);

    let sequence = [true, true, false, false, true, false, true, true, true, false];
    let mut previous = false;
    let mut expected = 0;
    for value in sequence {
        if value != previous {
            expected += 1;
        }
        previous = value;
        notifier.set_loading(value);
        assert_eq!(notifier.is_loading(), value);
        assert_eq!(hits.get(), expected);
    }
}

#[test]
fn notify_fires_every_subscriber_once_without_a_change() {
    let notifier = StateNotifier::new();
    let (a_hits, a) = counter();
    let (b_hits, b) = counter();
    let _a = notifier.subscribe(a);
    let _b = notifier.subscribe(b);

    notifier.notify();
    assert_eq!((a_hits.get(), b_hits.get()), (1, 1));

    notifier.set_loading(true);
    notifier.notify();
    assert_eq!((a_hits.get(), b_hits.get()), (3, 3));
    assert!(notifier.is_loading());
}

#[test]
fn unsubscribed_callback_never_fires_again() {
    let notifier = StateNotifier::new();
    let (a_hits, a) = counter();
    let handle = notifier.subscribe(a);
    notifier.set_loading(true);
    assert_eq!(a_hits.get(), 1);

    notifier.unsubscribe(handle);
    for _ in 0..3 {
        let (_hits, other) = counter();
        let _ = notifier.subscribe(other);
    }
    notifier.set_loading(false);
    notifier.notify();

    assert_eq!(a_hits.get(), 1);
    assert_eq!(notifier.subscriber_count(), 3);
}

#[test]
fn unsubscribe_of_unknown_or_removed_handle_is_noop() {
    let notifier = StateNotifier::new();
    let (b_hits, b) = counter();
    let (_a_hits, a) = counter();
    let a = notifier.subscribe(a);
    let _b = notifier.subscribe(b);

    notifier.unsubscribe(a);
    notifier.unsubscribe(a);

    // A handle the notifier never issued.
    let foreign = StateNotifier::new();
    let unknown: SubscriptionHandle = (0..11)
        .map(|_| foreign.subscribe(|| {}))
        .last()
        .unwrap();
    notifier.unsubscribe(unknown);

    assert_eq!(notifier.subscriber_count(), 1);
    notifier.notify();
    assert_eq!(b_hits.get(), 1);
}

#[test]
fn same_callback_twice_is_invoked_twice() {
    let notifier = StateNotifier::new();
    let (hits, callback) = counter();
    let first = notifier.subscribe(callback.clone());
    let second = notifier.subscribe(callback);
    assert_ne!(first, second);

    notifier.set_loading(true);
    assert_eq!(hits.get(), 2);

    notifier.unsubscribe(first);
    notifier.set_loading(false);
    assert_eq!(hits.get(), 3);
}

#[test]
fn subscribers_fire_in_registration_order() {
    let notifier = StateNotifier::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for name in ["a", "b", "c"] {
        let order = order.clone();
        let _ = notifier.subscribe(move || order.borrow_mut().push(name));
    }

    notifier.notify();
    assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
}

#[test]
fn callbacks_observe_the_new_value() {
    let notifier = Rc::new(StateNotifier::new());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let weak = Rc::downgrade(&notifier);
    let sink = seen.clone();
    let _handle = notifier.subscribe(move || {
        if let Some(notifier) = weak.upgrade() {
            sink.borrow_mut().push(notifier.is_loading());
        }
    });

    notifier.set_loading(true);
    notifier.set_loading(false);
    assert_eq!(*seen.borrow(), vec![true, false]);
}

#[test]
fn panicking_subscriber_does_not_block_the_others() {
    init_logging();
    let notifier = StateNotifier::new();
    let (before_hits, before) = counter();
    let (after_hits, after) = counter();
    let _before = notifier.subscribe(before);
    let _broken = notifier.subscribe(|| panic!("broken view"));
    let _after = notifier.subscribe(after);

    notifier.set_loading(true);
    assert_eq!(before_hits.get(), 1);
    assert_eq!(after_hits.get(), 1);
    assert!(notifier.is_loading());

    // The broken subscriber stays registered and keeps being isolated.
    notifier.notify();
    assert_eq!(after_hits.get(), 2);
    assert_eq!(notifier.subscriber_count(), 3);
}

#[test]
fn unsubscribing_a_later_handle_mid_round_skips_it() {
    let notifier = Rc::new(StateNotifier::new());
    let later: Rc<Cell<Option<SubscriptionHandle>>> = Rc::new(Cell::new(None));
    let weak = Rc::downgrade(&notifier);
    let target = later.clone();
    let _first = notifier.subscribe(move || {
        if let (Some(notifier), Some(handle)) = (weak.upgrade(), target.get()) {
            notifier.unsubscribe(handle);
        }
    });
    let (later_hits, later_callback) = counter();
    later.set(Some(notifier.subscribe(later_callback)));

    notifier.notify();
    assert_eq!(later_hits.get(), 0);
    assert_eq!(notifier.subscriber_count(), 1);
}

#[test]
fn subscriber_added_mid_round_fires_from_the_next_round() {
    let notifier = Rc::new(StateNotifier::new());
    let (late_hits, late) = counter();
    let weak = Rc::downgrade(&notifier);
    let added = Rc::new(Cell::new(false));
    let flag = added.clone();
    let _adder = notifier.subscribe(move || {
        if flag.replace(true) {
            return;
        }
        if let Some(notifier) = weak.upgrade() {
            let _ = notifier.subscribe(late.clone());
        }
    });

    notifier.notify();
    assert_eq!(late_hits.get(), 0);
    notifier.notify();
    assert_eq!(late_hits.get(), 1);
}

#[test]
fn set_loading_from_inside_a_callback_is_reentrant() {
    let notifier = Rc::new(StateNotifier::new());
    let weak = Rc::downgrade(&notifier);
    let (hits, callback) = counter();
    let _reset = notifier.subscribe(move || {
        if let Some(notifier) = weak.upgrade() {
            if notifier.is_loading() {
                notifier.set_loading(false);
            }
        }
    });
    let _count = notifier.subscribe(callback);

    notifier.set_loading(true);
    assert!(!notifier.is_loading());
    // Outer round (true) plus nested round (false).
    assert_eq!(hits.get(), 2);
}

#[test]
fn end_to_end_scenario() {
    init_logging();
    let notifier = StateNotifier::new();
    assert!(!notifier.is_loading());

    let (a_hits, a) = counter();
    let a = notifier.subscribe(a);
    notifier.set_loading(true);
    assert_eq!(a_hits.get(), 1);
    assert!(notifier.is_loading());

    let (b_hits, b) = counter();
    let _b = notifier.subscribe(b);
    notifier.set_loading(true);
    assert_eq!((a_hits.get(), b_hits.get()), (1, 0));

    notifier.set_loading(false);
    assert_eq!((a_hits.get(), b_hits.get()), (2, 1));

    notifier.unsubscribe(a);
    notifier.set_loading(true);
    assert_eq!((a_hits.get(), b_hits.get()), (2, 2));
}
