//! Front-routing activation.
//!
//! The fronted dialer itself lives outside this crate. What it consumes is
//! the [`FrontedState`] published here: TLS client settings built on the
//! current trust pool plus the masquerade sets to dial through.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use rustls::ClientConfig;

use crate::config::MasqueradeSets;
use crate::error::{RefreshError, RefreshResult};
use crate::security::trust_pool::TrustPool;

/// Receives new trust material and masquerades for fronted connections.
pub trait FrontRouting: Send + Sync {
    fn configure(&self, pool: &TrustPool, masquerades: &MasqueradeSets) -> RefreshResult<()>;
}

/// Settings in effect for subsequent fronted connections.
pub struct FrontedState {
    pub tls: Arc<ClientConfig>,
    pub masquerades: MasqueradeSets,
    pub trusted_roots: usize,
    /// Increments on every successful `configure`.
    pub generation: u64,
}

impl std::fmt::Debug for FrontedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontedState")
            .field("masquerade_sets", &self.masquerades.len())
            .field("trusted_roots", &self.trusted_roots)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Default [`FrontRouting`] holding the active state behind an atomic swap.
#[derive(Debug, Default)]
pub struct FrontedRouter {
    active: ArcSwapOption<FrontedState>,
    generation: AtomicU64,
}

impl FrontedRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// State in effect, or `None` before the first activation.
    pub fn current(&self) -> Option<Arc<FrontedState>> {
        self.active.load_full()
    }
}

impl FrontRouting for FrontedRouter {
    fn configure(&self, pool: &TrustPool, masquerades: &MasqueradeSets) -> RefreshResult<()> {
        let tls = client_config(pool)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.active.store(Some(Arc::new(FrontedState {
            tls: Arc::new(tls),
            masquerades: masquerades.clone(),
            trusted_roots: pool.len(),
            generation,
        })));

        tracing::info!(
            trusted_roots = pool.len(),
            masquerade_sets = masquerades.len(),
            generation,
            "Fronted routing configured"
        );
        Ok(())
    }
}

fn client_config(pool: &TrustPool) -> RefreshResult<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| RefreshError::Routing(e.to_string()))?
        .with_root_certificates(pool.roots())
        .with_no_client_auth();
    Ok(config)
}
