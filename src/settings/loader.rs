//! Settings loading from disk.

use std::fs;
use std::path::Path;

use crate::settings::schema::RefreshSettings;

/// Error type for settings loading.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Parse error: {}", e),
            SettingsError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SettingsError {}

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<RefreshSettings, SettingsError> {
    let content = fs::read_to_string(path).map_err(SettingsError::Io)?;
    let settings: RefreshSettings = toml::from_str(&content).map_err(SettingsError::Parse)?;

    validate_settings(&settings).map_err(SettingsError::Validation)?;

    Ok(settings)
}

/// Semantic checks; returns every problem found, not just the first.
pub fn validate_settings(settings: &RefreshSettings) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (name, value) in [
        ("endpoints.primary_url", &settings.endpoints.primary_url),
        ("endpoints.fronted_url", &settings.endpoints.fronted_url),
    ] {
        if let Err(e) = url::Url::parse(value) {
            errors.push(format!("{} '{}' is not a valid URL: {}", name, value, e));
        }
    }

    if settings.fetch.timeout_secs == 0 {
        errors.push("fetch.timeout_secs must be greater than 0".to_string());
    }
    if settings.fetch.max_body_bytes == 0 {
        errors.push("fetch.max_body_bytes must be greater than 0".to_string());
    }
    if settings.schedule.interval_secs == 0 {
        errors.push("schedule.interval_secs must be greater than 0".to_string());
    }
    if settings.observability.metrics_enabled
        && settings
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(format!(
            "observability.metrics_address '{}' is not a socket address",
            settings.observability.metrics_address
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
