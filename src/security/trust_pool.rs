//! Certificate trust pool built from PEM strings.

use std::sync::Arc;

use rustls::RootCertStore;

use crate::error::{RefreshError, RefreshResult};

/// Root store derived from a configuration's trusted CA list.
///
/// Never stored on its own; rebuilt every time security settings are applied.
#[derive(Debug, Clone)]
pub struct TrustPool {
    roots: Arc<RootCertStore>,
}

impl TrustPool {
    /// Build a pool containing every certificate in `pems`.
    ///
    /// An empty input gives an empty pool. Each entry must hold at least one
    /// PEM certificate and every certificate must be accepted by the store;
    /// the first failure aborts the whole build.
    pub fn from_pems<'a, I>(pems: I) -> RefreshResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut roots = RootCertStore::empty();

        for (index, pem) in pems.into_iter().enumerate() {
            let mut reader = pem.as_bytes();
            let certs = rustls_pemfile::certs(&mut reader)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| RefreshError::TrustPool {
                    index,
                    reason: format!("unreadable PEM: {}", e),
                })?;

            if certs.is_empty() {
                return Err(RefreshError::TrustPool {
                    index,
                    reason: "no certificate found in PEM".to_string(),
                });
            }

            for cert in certs {
                roots.add(cert).map_err(|e| RefreshError::TrustPool {
                    index,
                    reason: e.to_string(),
                })?;
            }
        }

        Ok(Self {
            roots: Arc::new(roots),
        })
    }

    /// Number of trust anchors.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Shared handle to the underlying store.
    pub fn roots(&self) -> Arc<RootCertStore> {
        self.roots.clone()
    }
}
