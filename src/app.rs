use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::{self, ApiState};
use crate::clock::{Clock, SystemClock};
use crate::config::ServerConfig;
use crate::lifecycle::LifecycleScheduler;
use crate::store::AssignmentStore;

/// Main service that wires the store, the scheduler and the HTTP surface.
pub struct App {
    pub config: ServerConfig,
    pub store: AssignmentStore,
    pub scheduler: Arc<LifecycleScheduler>,
}

impl App {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        let store = AssignmentStore::new(clock);
        let scheduler = Arc::new(LifecycleScheduler::new(
            store.clone(),
            config.lifecycle.clone(),
        ));

        Self {
            config,
            store,
            scheduler,
        }
    }

    pub fn api_state(&self) -> ApiState {
        ApiState {
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
        }
    }

    /// Run the service until `shutdown` is cancelled.
    ///
    /// 1. Spawns the lifecycle scheduler loop
    /// 2. Runs the HTTP server (blocking)
    /// 3. On shutdown, waits for an in-flight reconciliation pass to finish
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP listener cannot be bound or the server
    /// fails. The scheduler is stopped in either case.
    pub async fn run(self, shutdown: CancellationToken) -> std::io::Result<()> {
        let scheduler_task = self.scheduler.spawn(shutdown.clone());

        let served = api::serve(self.config.listen_addr, self.api_state(), shutdown.clone()).await;
        if let Err(ref e) = served {
            tracing::error!(error = %e, "HTTP server failed");
        }

        shutdown.cancel();
        if let Err(e) = scheduler_task.await {
            tracing::error!(error = %e, "Lifecycle scheduler task failed");
        }

        tracing::info!("Shutdown complete");
        served
    }
}
