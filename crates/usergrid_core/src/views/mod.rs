//! Views that bind to the session notifier.
mod counter;
mod status;
mod users;

pub use counter::CounterView;
pub use status::StatusBar;
pub use users::{UsersPage, USERS_CONTAINER};
