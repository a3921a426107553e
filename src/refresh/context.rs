//! Owning context for the refresher's shared state.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::config::{default_configuration, Configuration, LiveConfig};
use crate::fetch::EtagCache;

/// Live configuration, ETag cache and the guard that serializes cycles.
///
/// Passed explicitly to everything that reads or writes refresh state.
#[derive(Debug)]
pub struct RefreshContext {
    live: LiveConfig,
    etag: EtagCache,
    cycle: Mutex<()>,
}

impl RefreshContext {
    pub fn new(initial: Configuration) -> Self {
        Self {
            live: LiveConfig::new(initial),
            etag: EtagCache::new(),
            cycle: Mutex::new(()),
        }
    }

    pub fn live(&self) -> &LiveConfig {
        &self.live
    }

    pub fn etag(&self) -> &EtagCache {
        &self.etag
    }

    /// Current live configuration.
    pub fn snapshot(&self) -> Arc<Configuration> {
        self.live.snapshot()
    }

    /// Held from fetch through security apply.
    pub(crate) async fn lock_cycle(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().await
    }
}

impl Default for RefreshContext {
    fn default() -> Self {
        Self::new(default_configuration())
    }
}
