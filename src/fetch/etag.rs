//! Last-seen validator for conditional fetches.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Holds the most recent `ETag` returned with a 200.
///
/// Empty at startup and never cleared afterwards.
#[derive(Debug, Default)]
pub struct EtagCache {
    inner: ArcSwapOption<String>,
}

impl EtagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached validator, if any.
    pub fn get(&self) -> Option<String> {
        self.inner.load_full().map(|etag| etag.as_ref().clone())
    }

    pub fn store(&self, etag: impl Into<String>) {
        self.inner.store(Some(Arc::new(etag.into())));
    }
}
