//! Session-wide ambient flags with change notification.
//!
//! `StateNotifier` is the single source of truth for flags that several
//! independent views care about (currently only the global loading flag).
//! Views register a re-render callback and get called back synchronously
//! whenever a tracked flag actually changes value.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use usergrid_logging::{grid_debug, grid_error, grid_trace};

type Callback = Rc<dyn Fn()>;

/// Opaque token identifying one registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(u64);

/// Snapshot of every flag tracked by the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmbientFlags {
    pub loading: bool,
}

/// Holds the ambient flags and the subscriber set.
///
/// Single-threaded by construction: callbacks run on the caller's turn,
/// before the mutating call returns. Handles are allocated from a
/// monotonically increasing counter, so iterating the map visits
/// subscribers in registration order.
#[derive(Default)]
pub struct StateNotifier {
    flags: Cell<AmbientFlags>,
    next_handle: Cell<u64>,
    subscribers: RefCell<BTreeMap<SubscriptionHandle, Callback>>,
}

impl StateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.flags.get().loading
    }

    pub fn flags(&self) -> AmbientFlags {
        self.flags.get()
    }

    /// Stores `value` and notifies subscribers if it differs from the
    /// stored one. Repeated writes of the same value are silent.
    pub fn set_loading(&self, value: bool) {
        self.update_flags(|flags| flags.loading = value);
    }

    /// Registers `callback` for every future notification.
    ///
    /// No deduplication: registering the same closure twice yields two
    /// handles and two invocations per notification.
    #[must_use = "dropping the handle makes the callback impossible to unsubscribe"]
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn() + 'static,
    {
        let handle = SubscriptionHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.subscribers
            .borrow_mut()
            .insert(handle, Rc::new(callback));
        grid_trace!("Subscribed {:?}", handle);
        handle
    }

    /// Removes the callback behind `handle`. Unknown or already removed
    /// handles are ignored.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        if self.subscribers.borrow_mut().remove(&handle).is_some() {
            grid_trace!("Unsubscribed {:?}", handle);
        } else {
            grid_trace!("Unsubscribe of unknown handle {:?} ignored", handle);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Invokes every current subscriber once, whether or not anything
    /// changed.
    ///
    /// A panicking callback is logged and skipped; the remaining
    /// subscribers still run. Callbacks may re-enter the notifier. A handle
    /// removed mid-round is not invoked for the rest of that round, and a
    /// handle added mid-round first fires on the next one.
    pub fn notify(&self) {
        let handles: Vec<SubscriptionHandle> = self.subscribers.borrow().keys().copied().collect();
        for handle in handles {
            let callback = self.subscribers.borrow().get(&handle).cloned();
            let Some(callback) = callback else {
                continue;
            };
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback())) {
                grid_error!(
                    "Subscriber {:?} panicked during notification: {}",
                    handle,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    fn update_flags(&self, apply: impl FnOnce(&mut AmbientFlags)) {
        let before = self.flags.get();
        let mut after = before;
        apply(&mut after);
        if after == before {
            return;
        }
        self.flags.set(after);
        grid_debug!("Ambient flags changed: {:?} -> {:?}", before, after);
        self.notify();
    }
}

impl fmt::Debug for StateNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNotifier")
            .field("flags", &self.flags.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
