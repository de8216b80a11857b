//! Usergrid core: session notifier, view binding, and the users-page state machine.
mod binding;
mod columns;
mod effect;
mod failure;
mod grid;
mod msg;
mod notifier;
mod record;
mod session;
mod source;
mod state;
mod update;
mod view_model;
pub mod views;

pub use binding::{LoadingFlag, LoadingGuard, RenderCounter, ViewBinding};
pub use columns::{format_cell, Column, EMPTY_CELL};
pub use effect::Effect;
pub use failure::{FailureKind, FetchFailure};
pub use grid::{
    GridBridge, GridError, GridEvent, GridEventQueue, GridEventSink, GridHandle, GridOptions,
    GridOptionsPatch, GridWidget, SelectionMode,
};
pub use msg::Msg;
pub use notifier::{AmbientFlags, StateNotifier, SubscriptionHandle};
pub use record::{Address, Company, UserId, UserRecord};
pub use session::SessionContext;
pub use source::UserSource;
pub use state::{LoadPhase, UsersState};
pub use update::update;
pub use view_model::{
    CounterViewModel, ErrorBanner, StatusViewModel, UserRowView, UsersViewModel, RETRY_LABEL,
};
