use crate::{FetchFailure, UserRecord};

/// Data-fetch collaborator: fetch, parse, or fail.
///
/// Futures are `?Send` because views drive them on the single UI thread.
#[async_trait::async_trait(?Send)]
pub trait UserSource {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchFailure>;
}
