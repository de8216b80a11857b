use crate::view_model::{ErrorBanner, UserRowView, UsersViewModel, RETRY_LABEL};
use crate::{format_cell, Column, FetchFailure, UserId, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// State of the users page, advanced only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsersState {
    phase: LoadPhase,
    rows: Vec<UserRecord>,
    failure: Option<FetchFailure>,
    selected: Vec<UserId>,
    last_clicked: Option<UserId>,
    attempts: u32,
    dirty: bool,
}

impl UsersState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn rows(&self) -> &[UserRecord] {
        &self.rows
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        self.failure.as_ref()
    }

    pub fn selected(&self) -> &[UserId] {
        &self.selected
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns whether anything changed since the last call, and resets it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> UsersViewModel {
        let rows = self
            .rows
            .iter()
            .map(|record| UserRowView {
                user_id: record.id,
                cells: Column::ALL
                    .iter()
                    .map(|column| format_cell(*column, record))
                    .collect(),
                selected: self.selected.contains(&record.id),
            })
            .collect();

        let selected_names = self
            .selected
            .iter()
            .filter_map(|id| self.name_of(*id))
            .collect();

        let error = self.failure.as_ref().map(|failure| ErrorBanner {
            kind: failure.kind,
            message: failure.user_message(),
            retry_label: failure.is_retryable().then_some(RETRY_LABEL),
        });

        UsersViewModel {
            phase: self.phase,
            headers: Column::ALL.iter().map(|column| column.header()).collect(),
            row_count: self.rows.len(),
            rows,
            selected_names,
            last_clicked: self.last_clicked.and_then(|id| self.name_of(id)),
            error,
            attempts: self.attempts,
            local_loading: false,
            dirty: self.dirty,
        }
    }

    pub(crate) fn start_loading(&mut self) {
        self.phase = LoadPhase::Loading;
        self.failure = None;
        self.attempts += 1;
        self.dirty = true;
    }

    pub(crate) fn apply_success(&mut self, rows: Vec<UserRecord>) {
        self.phase = LoadPhase::Loaded;
        self.rows = rows;
        self.selected.clear();
        self.last_clicked = None;
        self.dirty = true;
    }

    pub(crate) fn apply_failure(&mut self, failure: FetchFailure) {
        self.phase = LoadPhase::Failed;
        self.failure = Some(failure);
        self.dirty = true;
    }

    /// Falls back to whatever was shown before the fetch started.
    pub(crate) fn cancel_loading(&mut self) {
        self.phase = if self.rows.is_empty() {
            LoadPhase::Idle
        } else {
            LoadPhase::Loaded
        };
        self.dirty = true;
    }

    /// Ignores clicks on ids that are not loaded.
    pub(crate) fn record_click(&mut self, user_id: UserId) {
        if self.contains(user_id) && self.last_clicked != Some(user_id) {
            self.last_clicked = Some(user_id);
            self.dirty = true;
        }
    }

    /// Keeps only loaded ids, without duplicates, in the order given.
    pub(crate) fn set_selection(&mut self, user_ids: Vec<UserId>) {
        let mut selected = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if self.contains(id) && !selected.contains(&id) {
                selected.push(id);
            }
        }
        if selected != self.selected {
            self.selected = selected;
            self.dirty = true;
        }
    }

    fn contains(&self, user_id: UserId) -> bool {
        self.rows.iter().any(|record| record.id == user_id)
    }

    fn name_of(&self, user_id: UserId) -> Option<String> {
        self.rows
            .iter()
            .find(|record| record.id == user_id)
            .map(|record| record.name.clone())
    }
}
