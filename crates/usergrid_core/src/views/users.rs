use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use usergrid_logging::{grid_debug, grid_info, grid_warn};

use crate::binding::{LoadingFlag, RenderCounter, ViewBinding};
use crate::{
    update, Effect, GridBridge, GridError, GridEvent, GridEventQueue, GridHandle,
    GridOptionsPatch, GridWidget, Msg, SessionContext, UserRecord, UserSource, UsersState,
    UsersViewModel,
};

/// Container id the users grid is created into.
pub const USERS_CONTAINER: &str = "users-grid";

/// Users page: fetches the dataset, feeds the grid, and tracks selection.
///
/// All state transitions go through [`update`]; this type only runs the
/// resulting effects. No `RefCell` borrow is held across an `.await`, so
/// other views may freely interleave while a fetch is suspended.
pub struct UsersPage {
    state: RefCell<UsersState>,
    local_loading: LoadingFlag,
    renders: RenderCounter,
    source: Rc<dyn UserSource>,
    grid: RefCell<GridBridge>,
    events: GridEventQueue,
    binding: ViewBinding,
}

impl UsersPage {
    pub fn new(
        context: &SessionContext,
        source: Rc<dyn UserSource>,
        widget: Rc<dyn GridWidget>,
    ) -> Self {
        let renders = RenderCounter::new();
        let binding = ViewBinding::mount("users", context, renders.callback());
        Self {
            state: RefCell::new(UsersState::new()),
            local_loading: LoadingFlag::new(),
            renders,
            source,
            grid: RefCell::new(GridBridge::new(widget, USERS_CONTAINER)),
            events: GridEventQueue::new(),
            binding,
        }
    }

    pub fn attach_grid(&self, patch: &GridOptionsPatch) -> Result<GridHandle, GridError> {
        let sink = Rc::new(self.events.clone());
        self.grid.borrow_mut().attach(patch, sink)
    }

    pub async fn load(&self) {
        self.run(Msg::LoadRequested).await;
    }

    pub async fn retry(&self) {
        self.run(Msg::RetryClicked).await;
    }

    /// Feeds queued grid events into the state machine; returns how many
    /// were processed.
    pub fn pump_grid_events(&self) -> usize {
        let events = self.events.drain();
        let count = events.len();
        for event in events {
            let msg = match event {
                GridEvent::RowClicked { user_id } => Msg::RowClicked { user_id },
                GridEvent::SelectionChanged { user_ids } => Msg::SelectionChanged { user_ids },
            };
            let effects = self.dispatch(msg);
            if !effects.is_empty() {
                grid_warn!("Grid event produced {} unexpected effects", effects.len());
            }
        }
        count
    }

    pub fn selected_rows(&self) -> Result<Vec<UserRecord>, GridError> {
        self.grid.borrow().selected_rows()
    }

    pub fn is_locally_loading(&self) -> bool {
        self.local_loading.get()
    }

    /// Times the shared notifier asked this page to re-render.
    pub fn renders(&self) -> u64 {
        self.renders.get()
    }

    pub fn view(&self) -> UsersViewModel {
        let mut view = self.state.borrow().view();
        view.local_loading = self.local_loading.get();
        view
    }

    /// Returns the view model only when state changed since the last call.
    pub fn take_dirty_view(&self) -> Option<UsersViewModel> {
        let view = self.view();
        self.state.borrow_mut().consume_dirty().then_some(view)
    }

    pub fn teardown(self) {
        self.binding.teardown();
        self.grid.borrow_mut().detach();
    }

    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = self.state.borrow_mut();
        let state = std::mem::take(&mut *guard);
        let (state, effects) = update(state, msg);
        *guard = state;
        effects
    }

    async fn run(&self, msg: Msg) {
        let mut pending: VecDeque<Effect> = self.dispatch(msg).into();
        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::FetchUsers => {
                    grid_debug!("Fetching users");
                    let in_flight = InFlightFetch { page: self, armed: true };
                    let result = {
                        let _busy = self.binding.begin_busy(&self.local_loading);
                        self.source.fetch_users().await
                    };
                    in_flight.disarm();
                    let msg = match result {
                        Ok(rows) => {
                            grid_info!("Fetched {} users", rows.len());
                            Msg::LoadSucceeded(rows)
                        }
                        Err(failure) => {
                            grid_warn!("User fetch failed: {}", failure);
                            Msg::LoadFailed(failure)
                        }
                    };
                    pending.extend(self.dispatch(msg));
                }
                Effect::ShowRows(rows) => {
                    if let Err(err) = self.grid.borrow().set_rows(&rows) {
                        grid_warn!("Could not push rows to grid: {}", err);
                    }
                }
            }
        }
    }
}

/// Reports a fetch that was dropped mid-await back to the state machine.
struct InFlightFetch<'a> {
    page: &'a UsersPage,
    armed: bool,
}

impl InFlightFetch<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightFetch<'_> {
    fn drop(&mut self) {
        if self.armed {
            grid_warn!("User fetch cancelled before completion");
            self.page.dispatch(Msg::LoadCancelled);
        }
    }
}
