//! Live configuration holder and updater.
//!
//! Readers take `Arc<Configuration>` snapshots; the updater builds a
//! candidate off to the side and publishes it with a single atomic store.
//! A reader therefore sees either the old or the new document, never a mix.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::schema::Configuration;
use crate::config::validation::validate_configuration;
use crate::error::{RefreshError, RefreshResult};

/// Parse raw document bytes into a candidate configuration.
pub fn parse_configuration(raw: &[u8]) -> RefreshResult<Configuration> {
    serde_yaml::from_slice(raw).map_err(RefreshError::ParseFailed)
}

/// The process-wide live configuration.
pub struct LiveConfig {
    current: ArcSwap<Configuration>,
    /// Serializes writers so compare-then-store cannot interleave.
    write_lock: Mutex<()>,
}

impl LiveConfig {
    pub fn new(initial: Configuration) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            write_lock: Mutex::new(()),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Configuration> {
        self.current.load_full()
    }

    /// Replace the live configuration with the document in `raw`.
    ///
    /// Fails with `ParseFailed`, `InvalidConfiguration` or `Unchanged`
    /// without touching the live snapshot. On success returns the newly
    /// published snapshot.
    pub fn update_from(&self, raw: &[u8]) -> RefreshResult<Arc<Configuration>> {
        self.update_with(raw, |_| Ok(())).map(|(snapshot, ())| snapshot)
    }

    /// Like [`update_from`](Self::update_from), but `prepare` runs on the
    /// changed, valid candidate before it is published. An error from
    /// `prepare` aborts the update and the live snapshot stays as it was.
    pub fn update_with<T, F>(&self, raw: &[u8], prepare: F) -> RefreshResult<(Arc<Configuration>, T)>
    where
        F: FnOnce(&Configuration) -> RefreshResult<T>,
    {
        let candidate = parse_configuration(raw)?;
        validate_configuration(&candidate)?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current.load();
        if **current == candidate {
            return Err(RefreshError::Unchanged);
        }

        let prepared = prepare(&candidate)?;

        let candidate = Arc::new(candidate);
        self.current.store(candidate.clone());

        tracing::debug!(
            chained_servers = candidate.client.chained_servers.len(),
            trusted_cas = candidate.trusted_cas.len(),
            "Live configuration replaced"
        );
        Ok((candidate, prepared))
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self::new(crate::config::defaults::default_configuration())
    }
}

impl std::fmt::Debug for LiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConfig")
            .field("summary", &self.current.load().summary())
            .finish()
    }
}
