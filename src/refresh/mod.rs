//! Refresh orchestration.
//!
//! # Data Flow
//! ```text
//! scheduler.rs (tick)
//!     → cycle.rs: lock cycle guard
//!         → fetch::ConfigFetcher::pull
//!         → config::LiveConfig::update_with
//!             → security::apply_security on the changed candidate
//!             → publish only if security settings applied
//!     → classify outcome, log, record metrics
//! ```
//!
//! # Design Decisions
//! - One cycle in flight at a time (context.rs guard spans fetch-through-apply)
//! - Failures never escape the scheduler; the previous snapshot stays live
//! - Live configuration and routed trust pool always come from the same document

pub mod context;
pub mod cycle;
pub mod scheduler;

pub use context::RefreshContext;
pub use cycle::Refresher;
pub use scheduler::{RefreshOutcome, RefreshScheduler};
