use crate::{FetchFailure, UserId, UserRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// View mounted or user asked for a refresh.
    LoadRequested,
    /// User clicked Retry on the error banner.
    RetryClicked,
    /// Data source returned parsed rows.
    LoadSucceeded(Vec<UserRecord>),
    /// Data source failed.
    LoadFailed(FetchFailure),
    /// The in-flight fetch was dropped before it finished.
    LoadCancelled,
    /// Grid reported a click on a row.
    RowClicked { user_id: UserId },
    /// Grid reported a new selection.
    SelectionChanged { user_ids: Vec<UserId> },
}
