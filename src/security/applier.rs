//! Re-derive trust and routing state from a configuration snapshot.

use crate::config::Configuration;
use crate::error::RefreshResult;
use crate::observability::metrics;
use crate::security::fronted::FrontRouting;
use crate::security::trust_pool::TrustPool;

/// Build the trust pool for `config` and hand it to `router`.
///
/// If the pool cannot be built the router is left exactly as it was.
pub fn apply_security(config: &Configuration, router: &dyn FrontRouting) -> RefreshResult<TrustPool> {
    let certs = config.trusted_certs();
    tracing::debug!(trusted_certs = certs.len(), "Building trusted CA pool");

    let pool = match TrustPool::from_pems(certs) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Unable to build trusted CA pool, fronting not configured");
            return Err(e);
        }
    };

    router.configure(&pool, &config.client.masquerade_sets)?;
    metrics::record_trusted_cas(pool.len());
    Ok(pool)
}
