use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::monitoring::Monitor;

#[derive(Default)]
pub(crate) struct MonitorSet {
    monitors: Vec<Box<dyn Monitor>>,
}

impl MonitorSet {
    pub fn add(&mut self, monitor: Box<dyn Monitor>) {
        self.monitors.push(monitor);
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn notify(&mut self, f: impl Fn(&dyn Monitor)) {
        self.monitors.retain(|monitor| {
            let result = catch_unwind(AssertUnwindSafe(|| f(&**monitor)));
            if result.is_err() {
                tracing::error!(monitor = %monitor.name(), "Monitor panicked, removing");
            }
            result.is_ok()
        });
    }
}
