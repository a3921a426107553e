//! One refresh cycle: fetch → apply security to the candidate → commit.

use std::sync::Arc;

use crate::config::Configuration;
use crate::error::{RefreshError, RefreshResult};
use crate::fetch::ConfigFetcher;
use crate::observability::metrics;
use crate::refresh::context::RefreshContext;
use crate::security::{apply_security, FrontRouting, TrustPool};
use crate::settings::EtagPolicy;

/// Drives refresh cycles against a shared [`RefreshContext`].
pub struct Refresher {
    context: Arc<RefreshContext>,
    fetcher: ConfigFetcher,
    router: Arc<dyn FrontRouting>,
}

impl Refresher {
    pub fn new(context: Arc<RefreshContext>, fetcher: ConfigFetcher, router: Arc<dyn FrontRouting>) -> Self {
        Self {
            context,
            fetcher,
            router,
        }
    }

    pub fn context(&self) -> &Arc<RefreshContext> {
        &self.context
    }

    /// Apply security settings for whatever is live now (normally the
    /// embedded defaults), before any fetch has happened.
    pub async fn bootstrap(&self) -> RefreshResult<TrustPool> {
        let _cycle = self.context.lock_cycle().await;
        apply_security(&self.context.snapshot(), self.router.as_ref())
    }

    /// Run a full cycle and return the newly committed snapshot.
    ///
    /// Security settings are derived from a changed, valid candidate before it
    /// is published; if they cannot be applied the candidate is discarded.
    /// Every error leaves the previous snapshot live and routing as it was.
    pub async fn refresh(&self) -> RefreshResult<Arc<Configuration>> {
        let _cycle = self.context.lock_cycle().await;

        let fetched = self.fetcher.pull(self.context.etag()).await?;
        let committed = self
            .context
            .live()
            .update_with(&fetched.body, |candidate| apply_security(candidate, self.router.as_ref()));

        if self.fetcher.etag_policy() == EtagPolicy::OnCommit
            && matches!(committed, Ok(_) | Err(RefreshError::Unchanged))
        {
            if let Some(etag) = &fetched.etag {
                self.context.etag().store(etag.as_str());
            }
        }

        let (snapshot, pool) = committed?;
        let summary = snapshot.summary();
        tracing::info!(
            chained_servers = summary.chained_servers,
            masquerades = summary.masquerades,
            trusted_cas = summary.trusted_cas,
            trusted_roots = pool.len(),
            instance_id = %summary.instance_id,
            version = %summary.version_tag,
            "Configuration updated from cloud"
        );

        metrics::record_refresh_success();
        Ok(snapshot)
    }
}

impl std::fmt::Debug for Refresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refresher")
            .field("fetcher", &self.fetcher)
            .field("context", &self.context)
            .finish()
    }
}
