//! Remote configuration model and updater.
//!
//! # Data Flow
//! ```text
//! decompressed document bytes
//!     → live.rs (parse with serde_yaml)
//!     → validation.rs (usability check)
//!     → compare with current snapshot
//!     → caller's prepare step (security applier) on the candidate
//!     → atomic swap of Arc<Configuration>
//! ```
//!
//! # Design Decisions
//! - A snapshot is immutable once published; updates replace it whole
//! - defaults.rs seeds the live value so readers never see "no config"
//! - Equality is the derived, order-sensitive field-by-field comparison

pub mod defaults;
pub mod live;
pub mod schema;
pub mod validation;

pub use defaults::default_configuration;
pub use live::{parse_configuration, LiveConfig};
pub use schema::{ChainedServer, ClientSettings, Configuration, Masquerade, MasqueradeSets, TrustedCa};
