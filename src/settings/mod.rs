//! Settings for the refresher process.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & validate)
//!     → RefreshSettings (compiled-in defaults for anything omitted)
//!     → fetcher, scheduler, observability
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_settings, SettingsError};
pub use schema::{EtagPolicy, FetchSettings, RefreshSettings, ScheduleSettings};
