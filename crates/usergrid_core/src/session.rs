use std::rc::Rc;

use crate::StateNotifier;

/// Per-session context handed to every view constructor.
///
/// Owned by the application bootstrap; clones share the same notifier.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    notifier: Rc<StateNotifier>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifier(&self) -> &Rc<StateNotifier> {
        &self.notifier
    }
}
