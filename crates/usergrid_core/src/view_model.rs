use crate::{FailureKind, LoadPhase, UserId};

pub const RETRY_LABEL: &str = "Retry";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsersViewModel {
    pub phase: LoadPhase,
    pub headers: Vec<&'static str>,
    pub rows: Vec<UserRowView>,
    pub row_count: usize,
    pub selected_names: Vec<String>,
    pub last_clicked: Option<String>,
    pub error: Option<ErrorBanner>,
    pub attempts: u32,
    /// The page's own loading flag, independent of the shared one.
    pub local_loading: bool,
    /// State changed since the page last handed out a view.
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRowView {
    pub user_id: UserId,
    pub cells: Vec<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub kind: FailureKind,
    pub message: String,
    pub retry_label: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterViewModel {
    pub count: u64,
    pub busy: bool,
    pub renders: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusViewModel {
    pub busy: bool,
    pub renders: u64,
}
