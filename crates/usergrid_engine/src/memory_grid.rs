//! Headless grid widget used by the demo and tests.
//!
//! Mirrors the behaviour the UI relies on from a real grid: creation into a
//! known container, row replacement, selection, pagination, and
//! row-click/selection callbacks. Simulated user input goes through
//! [`MemoryGrid::click_row`] and [`MemoryGrid::select_rows`].

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use usergrid_core::{
    GridError, GridEvent, GridEventSink, GridHandle, GridOptions, GridWidget, SelectionMode,
    UserRecord,
};
use usergrid_logging::{grid_debug, grid_trace};

struct GridInstance {
    container: String,
    options: GridOptions,
    rows: Vec<UserRecord>,
    selected: Vec<usize>,
    events: Rc<dyn GridEventSink>,
}

impl GridInstance {
    fn selected_ids(&self) -> Vec<u32> {
        self.selected.iter().map(|idx| self.rows[*idx].id).collect()
    }
}

#[derive(Default)]
struct Registry {
    containers: BTreeSet<String>,
    next_handle: u64,
    instances: BTreeMap<GridHandle, GridInstance>,
}

/// Cloning shares the same registry, so a test can keep a handle for
/// simulating input while a view owns another.
#[derive(Clone, Default)]
pub struct MemoryGrid {
    registry: Rc<RefCell<Registry>>,
}

impl MemoryGrid {
    pub fn with_containers<I, S>(containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let grid = Self::default();
        for container in containers {
            grid.add_container(container);
        }
        grid
    }

    pub fn add_container(&self, container: impl Into<String>) {
        self.registry
            .borrow_mut()
            .containers
            .insert(container.into());
    }

    pub fn instance_count(&self) -> usize {
        self.registry.borrow().instances.len()
    }

    pub fn container_of(&self, handle: GridHandle) -> Option<String> {
        self.registry
            .borrow()
            .instances
            .get(&handle)
            .map(|instance| instance.container.clone())
    }

    pub fn options(&self, handle: GridHandle) -> Option<GridOptions> {
        self.registry
            .borrow()
            .instances
            .get(&handle)
            .map(|instance| instance.options.clone())
    }

    pub fn rows(&self, handle: GridHandle) -> Option<Vec<UserRecord>> {
        self.registry
            .borrow()
            .instances
            .get(&handle)
            .map(|instance| instance.rows.clone())
    }

    /// Rows on `page` (zero-based); everything when pagination is off.
    pub fn page(&self, handle: GridHandle, page: usize) -> Result<Vec<UserRecord>, GridError> {
        let registry = self.registry.borrow();
        let instance = registry
            .instances
            .get(&handle)
            .ok_or(GridError::UnknownHandle(handle))?;
        if !instance.options.pagination {
            return Ok(instance.rows.clone());
        }
        let size = instance.options.page_size;
        Ok(instance
            .rows
            .iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .cloned()
            .collect())
    }

    pub fn page_count(&self, handle: GridHandle) -> Result<usize, GridError> {
        let registry = self.registry.borrow();
        let instance = registry
            .instances
            .get(&handle)
            .ok_or(GridError::UnknownHandle(handle))?;
        if !instance.options.pagination {
            return Ok(1);
        }
        Ok(instance.rows.len().div_ceil(instance.options.page_size).max(1))
    }

    /// Simulates a click on the row at `row_index`.
    ///
    /// Emits `RowClicked`; in single-selection mode the row becomes the
    /// selection, in multiple-selection mode its selection is toggled.
    /// Either way `SelectionChanged` follows.
    pub fn click_row(&self, handle: GridHandle, row_index: usize) -> Result<(), GridError> {
        let (events, clicked, selection) = {
            let mut registry = self.registry.borrow_mut();
            let instance = registry
                .instances
                .get_mut(&handle)
                .ok_or(GridError::UnknownHandle(handle))?;
            let Some(row) = instance.rows.get(row_index) else {
                grid_trace!("Click on missing row {} ignored", row_index);
                return Ok(());
            };
            let clicked = row.id;
            match instance.options.selection {
                SelectionMode::Single => instance.selected = vec![row_index],
                SelectionMode::Multiple => {
                    if let Some(pos) = instance.selected.iter().position(|idx| *idx == row_index) {
                        instance.selected.remove(pos);
                    } else {
                        instance.selected.push(row_index);
                    }
                }
            }
            (
                Rc::clone(&instance.events),
                clicked,
                instance.selected_ids(),
            )
        };

        events.emit(GridEvent::RowClicked { user_id: clicked });
        events.emit(GridEvent::SelectionChanged {
            user_ids: selection,
        });
        Ok(())
    }

    /// Replaces the selection. Out-of-range indices are dropped, and single
    /// selection keeps only the last index.
    pub fn select_rows(&self, handle: GridHandle, indices: &[usize]) -> Result<(), GridError> {
        let (events, selection) = {
            let mut registry = self.registry.borrow_mut();
            let instance = registry
                .instances
                .get_mut(&handle)
                .ok_or(GridError::UnknownHandle(handle))?;
            let mut selected: Vec<usize> = Vec::new();
            for idx in indices {
                if *idx < instance.rows.len() && !selected.contains(idx) {
                    selected.push(*idx);
                }
            }
            if instance.options.selection == SelectionMode::Single {
                selected = selected.pop().into_iter().collect();
            }
            instance.selected = selected;
            (Rc::clone(&instance.events), instance.selected_ids())
        };

        events.emit(GridEvent::SelectionChanged {
            user_ids: selection,
        });
        Ok(())
    }
}

impl GridWidget for MemoryGrid {
    fn create(
        &self,
        container: &str,
        options: &GridOptions,
        events: Rc<dyn GridEventSink>,
    ) -> Result<GridHandle, GridError> {
        options.validate()?;
        let mut registry = self.registry.borrow_mut();
        if !registry.containers.contains(container) {
            return Err(GridError::ContainerNotFound(container.to_string()));
        }
        let handle = GridHandle(registry.next_handle);
        registry.next_handle += 1;
        registry.instances.insert(
            handle,
            GridInstance {
                container: container.to_string(),
                options: options.clone(),
                rows: Vec::new(),
                selected: Vec::new(),
                events,
            },
        );
        grid_debug!("Memory grid {:?} created in '{}'", handle, container);
        Ok(handle)
    }

    /// Replacing rows clears the selection and reports it if one existed.
    fn update_rows(&self, handle: GridHandle, rows: &[UserRecord]) -> Result<(), GridError> {
        let cleared = {
            let mut registry = self.registry.borrow_mut();
            let instance = registry
                .instances
                .get_mut(&handle)
                .ok_or(GridError::UnknownHandle(handle))?;
            instance.rows = rows.to_vec();
            let had_selection = !instance.selected.is_empty();
            instance.selected.clear();
            had_selection.then(|| Rc::clone(&instance.events))
        };

        if let Some(events) = cleared {
            events.emit(GridEvent::SelectionChanged {
                user_ids: Vec::new(),
            });
        }
        Ok(())
    }

    fn selected_rows(&self, handle: GridHandle) -> Result<Vec<UserRecord>, GridError> {
        let registry = self.registry.borrow();
        let instance = registry
            .instances
            .get(&handle)
            .ok_or(GridError::UnknownHandle(handle))?;
        Ok(instance
            .selected
            .iter()
            .map(|idx| instance.rows[*idx].clone())
            .collect())
    }

    fn destroy(&self, handle: GridHandle) {
        if self.registry.borrow_mut().instances.remove(&handle).is_some() {
            grid_debug!("Memory grid {:?} destroyed", handle);
        }
    }
}
