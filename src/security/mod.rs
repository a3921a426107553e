//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Changed, valid candidate (before it is published)
//!     → trust_pool.rs (trusted CA PEMs → RootCertStore)
//!     → fronted.rs (TLS client config + masquerades published)
//!     → fronted dialer uses the new state for later connections
//! ```
//!
//! # Design Decisions
//! - Fail closed: a bad certificate aborts before routing is touched
//! - The pool is always a pure function of the snapshot it was built from

pub mod applier;
pub mod fronted;
pub mod trust_pool;

pub use applier::apply_security;
pub use fronted::{FrontRouting, FrontedRouter, FrontedState};
pub use trust_pool::TrustPool;
