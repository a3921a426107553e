//! Remote configuration refresh library.
//!
//! Pulls a gzip-compressed YAML configuration document, swaps it into the
//! live configuration when it is valid and different, and re-applies the
//! trust pool and fronted routing derived from it.

pub mod config;
pub mod error;
pub mod fetch;
pub mod observability;
pub mod refresh;
pub mod security;
pub mod settings;

pub use config::Configuration;
pub use error::{RefreshError, RefreshResult};
pub use refresh::{RefreshContext, RefreshScheduler, Refresher};
pub use settings::RefreshSettings;
