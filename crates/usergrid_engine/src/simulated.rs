use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use usergrid_core::{FailureKind, FetchFailure, UserRecord, UserSource};
use usergrid_logging::{grid_info, grid_warn};

/// Wraps another source to demo failure states.
///
/// Fails with `kind` for the first `times` calls, then delegates. An
/// optional latency is applied to every call so busy indicators are
/// visible.
pub struct SimulatedUserSource {
    inner: Rc<dyn UserSource>,
    failure: Option<FailureKind>,
    remaining: Cell<u32>,
    latency: Duration,
    calls: Cell<u32>,
}

impl SimulatedUserSource {
    pub fn new(inner: Rc<dyn UserSource>) -> Self {
        Self {
            inner,
            failure: None,
            remaining: Cell::new(0),
            latency: Duration::ZERO,
            calls: Cell::new(0),
        }
    }

    pub fn failing(mut self, kind: FailureKind, times: u32) -> Self {
        self.failure = Some(kind);
        self.remaining.set(times);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

#[async_trait::async_trait(?Send)]
impl UserSource for SimulatedUserSource {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchFailure> {
        let call = self.calls.get() + 1;
        self.calls.set(call);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.failure {
            Some(kind) if self.remaining.get() > 0 => {
                let left = self.remaining.get() - 1;
                self.remaining.set(left);
                grid_warn!("Simulating {} on call {} ({} left)", kind, call, left);
                Err(FetchFailure::new(kind, format!("simulated {kind}")))
            }
            _ => {
                grid_info!("Simulation passing call {} through", call);
                self.inner.fetch_users().await
            }
        }
    }
}
