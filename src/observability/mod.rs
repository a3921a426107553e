//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! fetch, config, security, refresh:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//!     → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;
