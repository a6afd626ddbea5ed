use std::net::SocketAddr;
use std::time::Duration;

/// Default reconciliation period: one pass a minute.
pub const DEFAULT_RECONCILE_INTERVAL_MS: u64 = 60_000;

/// Configuration for the background reconciliation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Period between reconciliation passes, in milliseconds.
    ///
    /// An assignment whose due date passes is closed at most one period
    /// later. Ticks that fire while a pass is still running are skipped.
    pub interval_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_RECONCILE_INTERVAL_MS,
        }
    }
}

impl LifecycleConfig {
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Reconciliation period, clamped to at least one millisecond since
    /// `tokio::time::interval` rejects a zero period.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub lifecycle: LifecycleConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            lifecycle: LifecycleConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}
