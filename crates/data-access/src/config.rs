//! Configuration for the data access layer.

use serde::{Deserialize, Serialize};

/// Configuration for the backend client and the session cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAccessConfig {
    /// Backend base URL, without the `/api` suffix.
    pub base_url: String,

    /// Maximum cached keys; `None` keeps every entry for the session.
    pub cache_capacity: Option<usize>,

    /// Per-request timeout in seconds; `None` uses the client default.
    pub request_timeout_secs: Option<u64>,

    /// Substring marking a variable as a species variable.
    pub species_pattern: String,

    /// Emission placed at source 0 of a species variable.
    pub species_default_emission: f64,

    /// Emission placed at source 0 of any other variable.
    pub default_emission: f64,
}

impl Default for DataAccessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            cache_capacity: None,
            request_timeout_secs: None,
            species_pattern: "species".to_string(),
            species_default_emission: 5000.0,
            default_emission: 1.0,
        }
    }
}

impl DataAccessConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("VISOR_API_URL") {
            if !val.trim().is_empty() {
                config.base_url = val.trim().to_string();
            }
        }

        if let Ok(val) = std::env::var("VISOR_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                config.cache_capacity = Some(capacity);
            }
        }

        if let Ok(val) = std::env::var("VISOR_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout_secs = Some(secs);
            }
        }

        if let Ok(val) = std::env::var("VISOR_SPECIES_PATTERN") {
            config.species_pattern = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("base_url must be an http(s) URL: {}", self.base_url));
        }

        if self.cache_capacity == Some(0) {
            return Err("cache_capacity must be > 0".to_string());
        }

        if self.request_timeout_secs == Some(0) {
            return Err("request_timeout_secs must be > 0".to_string());
        }

        if self.species_pattern.is_empty() {
            return Err("species_pattern must not be empty".to_string());
        }

        for (name, value) in [
            ("species_default_emission", self.species_default_emission),
            ("default_emission", self.default_emission),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number", name));
            }
        }

        Ok(())
    }

    /// Emission placed at source 0 of a fresh scenario.
    pub fn first_emission(&self, is_species: bool) -> f64 {
        if is_species {
            self.species_default_emission
        } else {
            self.default_emission
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DataAccessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_capacity, None);
        assert_eq!(config.species_pattern, "species");
    }

    #[test]
    fn test_validate_rejects() {
        let bad_url = DataAccessConfig {
            base_url: "localhost:8000".into(),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());

        let zero_capacity = DataAccessConfig {
            cache_capacity: Some(0),
            ..Default::default()
        };
        assert!(zero_capacity.validate().is_err());

        let negative = DataAccessConfig {
            default_emission: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }
}
