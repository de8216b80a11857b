//! Contract with the grid widget and the bridge views use to drive it.
//!
//! The widget itself is a collaborator: it is created into a named
//! container, receives rows, reports the current selection, and pushes
//! row-click/selection events back through a [`GridEventSink`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use usergrid_logging::{grid_debug, grid_info};

use crate::{Column, UserId, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    Single,
    #[default]
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    pub columns: Vec<Column>,
    pub selection: SelectionMode,
    pub pagination: bool,
    pub page_size: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
            selection: SelectionMode::Multiple,
            pagination: true,
            page_size: 10,
        }
    }
}

/// Caller overrides merged over [`GridOptions::default`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptionsPatch {
    pub columns: Option<Vec<Column>>,
    pub selection: Option<SelectionMode>,
    pub pagination: Option<bool>,
    pub page_size: Option<usize>,
}

impl GridOptions {
    pub fn merged(mut self, patch: &GridOptionsPatch) -> Self {
        if let Some(columns) = &patch.columns {
            self.columns = columns.clone();
        }
        if let Some(selection) = patch.selection {
            self.selection = selection;
        }
        if let Some(pagination) = patch.pagination {
            self.pagination = pagination;
        }
        if let Some(page_size) = patch.page_size {
            self.page_size = page_size;
        }
        self
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.columns.is_empty() {
            return Err(GridError::InvalidOptions("no columns".into()));
        }
        if self.pagination && self.page_size == 0 {
            return Err(GridError::InvalidOptions(
                "page size must be positive when paginating".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    RowClicked { user_id: UserId },
    SelectionChanged { user_ids: Vec<UserId> },
}

pub trait GridEventSink {
    fn emit(&self, event: GridEvent);
}

/// Sink that parks widget events until the owning view drains them.
#[derive(Debug, Clone, Default)]
pub struct GridEventQueue {
    events: Rc<RefCell<VecDeque<GridEvent>>>,
}

impl GridEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<GridEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl GridEventSink for GridEventQueue {
    fn emit(&self, event: GridEvent) {
        self.events.borrow_mut().push_back(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid container '{0}' not found")]
    ContainerNotFound(String),
    #[error("invalid grid options: {0}")]
    InvalidOptions(String),
    #[error("grid has not been created")]
    NotCreated,
    #[error("unknown grid handle {0:?}")]
    UnknownHandle(GridHandle),
}

/// Capability set of the grid widget.
pub trait GridWidget {
    fn create(
        &self,
        container: &str,
        options: &GridOptions,
        events: Rc<dyn GridEventSink>,
    ) -> Result<GridHandle, GridError>;
    fn update_rows(&self, handle: GridHandle, rows: &[UserRecord]) -> Result<(), GridError>;
    fn selected_rows(&self, handle: GridHandle) -> Result<Vec<UserRecord>, GridError>;
    fn destroy(&self, handle: GridHandle);
}

/// Owns one widget instance bound to a container.
pub struct GridBridge {
    widget: Rc<dyn GridWidget>,
    container: String,
    handle: Option<GridHandle>,
}

impl GridBridge {
    pub fn new(widget: Rc<dyn GridWidget>, container: impl Into<String>) -> Self {
        Self {
            widget,
            container: container.into(),
            handle: None,
        }
    }

    /// Creates the widget with `patch` merged over the default options.
    /// Attaching twice returns the existing handle.
    pub fn attach(
        &mut self,
        patch: &GridOptionsPatch,
        events: Rc<dyn GridEventSink>,
    ) -> Result<GridHandle, GridError> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }
        let options = GridOptions::default().merged(patch);
        options.validate()?;
        let handle = self.widget.create(&self.container, &options, events)?;
        grid_info!(
            "Grid created in '{}' as {:?} ({} columns)",
            self.container,
            handle,
            options.columns.len()
        );
        self.handle = Some(handle);
        Ok(handle)
    }

    pub fn handle(&self) -> Option<GridHandle> {
        self.handle
    }

    pub fn set_rows(&self, rows: &[UserRecord]) -> Result<(), GridError> {
        let handle = self.handle.ok_or(GridError::NotCreated)?;
        grid_debug!("Pushing {} rows to grid {:?}", rows.len(), handle);
        self.widget.update_rows(handle, rows)
    }

    pub fn selected_rows(&self) -> Result<Vec<UserRecord>, GridError> {
        let handle = self.handle.ok_or(GridError::NotCreated)?;
        self.widget.selected_rows(handle)
    }

    pub fn detach(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.widget.destroy(handle);
            grid_debug!("Grid {:?} destroyed", handle);
        }
    }
}

impl Drop for GridBridge {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for GridBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridBridge")
            .field("container", &self.container)
            .field("handle", &self.handle)
            .finish()
    }
}
