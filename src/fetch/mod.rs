//! Configuration fetch subsystem.
//!
//! # Data Flow
//! ```text
//! EtagCache (last validator)
//!     → puller.rs (GET with If-None-Match, no-cache, Connection: close)
//!     → transport.rs (injected delivery: direct or fronted)
//!     → 304 → Unchanged
//!     → 200 → record ETag, gunzip, return bytes
//! ```

pub mod etag;
pub mod puller;
pub mod transport;

pub use etag::EtagCache;
pub use puller::{ConfigFetcher, Fetched, FRONTED_URL_HEADER};
pub use transport::{DirectTransport, Transport};
