//! Usergrid engine: data sources and the headless grid widget.
mod file;
mod http;
mod memory_grid;
mod simulated;

use usergrid_core::{FailureKind, FetchFailure, UserRecord};

pub use file::FileUserSource;
pub use http::{FetchSettings, HttpUserSource};
pub use memory_grid::MemoryGrid;
pub use simulated::SimulatedUserSource;

/// Parses a JSON array of user objects.
pub fn parse_users(bytes: &[u8]) -> Result<Vec<UserRecord>, FetchFailure> {
    serde_json::from_slice(bytes)
        .map_err(|err| FetchFailure::new(FailureKind::MalformedPayload, err.to_string()))
}
