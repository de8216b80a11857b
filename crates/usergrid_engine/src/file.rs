use std::io;
use std::path::{Path, PathBuf};

use usergrid_core::{FailureKind, FetchFailure, UserRecord, UserSource};
use usergrid_logging::grid_debug;

use crate::parse_users;

/// Reads the user dataset from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileUserSource {
    path: PathBuf,
}

impl FileUserSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait(?Send)]
impl UserSource for FileUserSource {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchFailure> {
        grid_debug!("Reading users from {:?}", self.path);
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            let kind = match err.kind() {
                io::ErrorKind::NotFound => FailureKind::NotFound,
                io::ErrorKind::PermissionDenied => FailureKind::Unauthorized,
                _ => FailureKind::Unexpected,
            };
            FetchFailure::new(kind, format!("{}: {err}", self.path.display()))
        })?;
        parse_users(&bytes)
    }
}
