use std::cell::Cell;

use crate::binding::{RenderCounter, ViewBinding};
use crate::view_model::CounterViewModel;
use crate::SessionContext;

/// Click counter that also shows whether any other view is busy.
#[derive(Debug)]
pub struct CounterView {
    count: Cell<u64>,
    renders: RenderCounter,
    binding: ViewBinding,
}

impl CounterView {
    pub fn new(context: &SessionContext) -> Self {
        let renders = RenderCounter::new();
        let binding = ViewBinding::mount("counter", context, renders.callback());
        Self {
            count: Cell::new(0),
            renders,
            binding,
        }
    }

    pub fn increment(&self) -> u64 {
        let next = self.count.get() + 1;
        self.count.set(next);
        next
    }

    pub fn view(&self) -> CounterViewModel {
        CounterViewModel {
            count: self.count.get(),
            busy: self.binding.notifier().is_loading(),
            renders: self.renders.get(),
        }
    }

    pub fn teardown(self) {
        self.binding.teardown();
    }
}
