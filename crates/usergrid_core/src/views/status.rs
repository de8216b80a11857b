use crate::binding::{RenderCounter, ViewBinding};
use crate::view_model::StatusViewModel;
use crate::SessionContext;

/// Global busy indicator.
#[derive(Debug)]
pub struct StatusBar {
    renders: RenderCounter,
    binding: ViewBinding,
}

impl StatusBar {
    pub fn new(context: &SessionContext) -> Self {
        let renders = RenderCounter::new();
        let binding = ViewBinding::mount("status", context, renders.callback());
        Self { renders, binding }
    }

    pub fn view(&self) -> StatusViewModel {
        StatusViewModel {
            busy: self.binding.notifier().is_loading(),
            renders: self.renders.get(),
        }
    }

    pub fn teardown(self) {
        self.binding.teardown();
    }
}
