//! Usability checks for candidate configurations.
//!
//! Serde handles syntax; this only decides whether a parsed document may
//! replace the live configuration.

use crate::config::schema::Configuration;
use crate::error::{RefreshError, RefreshResult};

/// A configuration is usable only if it names at least one chained server.
pub fn validate_configuration(config: &Configuration) -> RefreshResult<()> {
    if config.client.chained_servers.is_empty() {
        return Err(RefreshError::InvalidConfiguration(
            "no chained servers".to_string(),
        ));
    }
    Ok(())
}
