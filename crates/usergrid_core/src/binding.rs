//! Per-view discipline for attaching to the session notifier.
//!
//! A view mounts a [`ViewBinding`] on construction, which subscribes its
//! re-render callback. Dropping the binding (or calling
//! [`ViewBinding::teardown`]) unsubscribes exactly once, including when the
//! view goes away while a load is still in flight.
//!
//! Busy work is bracketed by a [`LoadingGuard`]. It raises the view's local
//! flag and the shared flag, and lowers them again in the same order when
//! dropped, so the cleanup runs on success, failure, and cancellation alike.
//! The local flag gives the originating view immediate feedback; the shared
//! flag coordinates every other view. Both are always written.

use std::cell::Cell;
use std::rc::Rc;

use usergrid_logging::grid_debug;

use crate::{SessionContext, StateNotifier, SubscriptionHandle};

/// View-private copy of the loading state.
#[derive(Debug, Default)]
pub struct LoadingFlag(Cell<bool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }

    fn set(&self, value: bool) {
        self.0.set(value);
    }
}

/// Shared counter bumped by a view's re-render callback.
#[derive(Debug, Clone, Default)]
pub struct RenderCounter(Rc<Cell<u64>>);

impl RenderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }

    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }

    /// Callback suitable for [`ViewBinding::mount`].
    pub fn callback(&self) -> impl Fn() + 'static {
        let counter = self.clone();
        move || counter.bump()
    }
}

/// A view's live subscription to the session notifier.
#[derive(Debug)]
pub struct ViewBinding {
    view: &'static str,
    notifier: Rc<StateNotifier>,
    handle: Option<SubscriptionHandle>,
}

impl ViewBinding {
    /// Subscribes `rerender` on behalf of the view named `view`.
    pub fn mount<F>(view: &'static str, context: &SessionContext, rerender: F) -> Self
    where
        F: Fn() + 'static,
    {
        let notifier = Rc::clone(context.notifier());
        let handle = notifier.subscribe(rerender);
        grid_debug!("View '{}' mounted as {:?}", view, handle);
        Self {
            view,
            notifier,
            handle: Some(handle),
        }
    }

    pub fn notifier(&self) -> &StateNotifier {
        &self.notifier
    }

    /// `None` once the binding has been torn down.
    pub fn handle(&self) -> Option<SubscriptionHandle> {
        self.handle
    }

    /// Raises `local` and then the shared loading flag.
    pub fn begin_busy<'a>(&'a self, local: &'a LoadingFlag) -> LoadingGuard<'a> {
        local.set(true);
        self.notifier.set_loading(true);
        LoadingGuard {
            local,
            notifier: &self.notifier,
        }
    }

    pub fn teardown(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.notifier.unsubscribe(handle);
            grid_debug!("View '{}' unmounted ({:?})", self.view, handle);
        }
    }
}

impl Drop for ViewBinding {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Clears the local flag and then the shared flag when dropped.
#[must_use = "the loading flags are cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LoadingGuard<'a> {
    local: &'a LoadingFlag,
    notifier: &'a StateNotifier,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.local.set(false);
        self.notifier.set_loading(false);
    }
}
