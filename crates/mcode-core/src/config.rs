//! Service configuration

use crate::error::ServiceError;
use mcode_index::Strategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration shared by the read and write services
///
/// ```toml
/// write_timeout_ms = 30000
/// use_model_code_index = true
/// prefer_subscription_on_read = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upper bound on one round-trip to the write collaborator
    pub write_timeout_ms: u64,
    /// Resolve through the model-code index instead of scanning
    pub use_model_code_index: bool,
    /// Domain value reads return the caller's own subscription
    pub prefer_subscription_on_read: bool,
}

impl ServiceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With write timeout, in whole milliseconds
    ///
    /// Anything shorter than a millisecond, zero included, becomes one
    /// millisecond, so the result always passes [`Self::validate`].
    #[inline]
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout_ms = u64::try_from(timeout.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self
    }

    /// With or without the model-code index
    #[inline]
    #[must_use]
    pub fn with_model_code_index(mut self, enabled: bool) -> Self {
        self.use_model_code_index = enabled;
        self
    }

    /// With or without subscription preference on domain reads
    #[inline]
    #[must_use]
    pub fn with_subscription_preference(mut self, enabled: bool) -> Self {
        self.prefer_subscription_on_read = enabled;
        self
    }

    /// Write timeout as a duration
    #[inline]
    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Resolution strategy selected by this configuration
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        if self.use_model_code_index {
            Strategy::Indexed
        } else {
            Strategy::Scan
        }
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// [`ServiceError::Config`] on malformed TOML or a zero timeout
    pub fn from_toml_str(raw: &str) -> Result<Self, ServiceError> {
        let config: Self = toml::from_str(raw).map_err(|e| ServiceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ServiceError::Config`] when the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ServiceError::Config`] for a zero write timeout
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.write_timeout_ms == 0 {
            return Err(ServiceError::Config(
                "write_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: 30_000,
            use_model_code_index: true,
            prefer_subscription_on_read: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ServiceConfig::new();
        assert_eq!(config.write_timeout(), Duration::from_secs(30));
        assert_eq!(config.strategy(), Strategy::Indexed);
        assert!(config.prefer_subscription_on_read);
    }

    #[test]
    fn builder_timeout_is_never_zero() {
        for timeout in [Duration::ZERO, Duration::from_micros(400)] {
            let config = ServiceConfig::new().with_write_timeout(timeout);
            assert_eq!(config.write_timeout(), Duration::from_millis(1));
            assert!(config.validate().is_ok());
        }
        let config = ServiceConfig::new().with_write_timeout(Duration::from_millis(250));
        assert_eq!(config.write_timeout_ms, 250);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ServiceConfig::from_toml_str("use_model_code_index = false").unwrap();
        assert_eq!(config.strategy(), Strategy::Scan);
        assert_eq!(config.write_timeout_ms, 30_000);
    }

    #[test]
    fn zero_timeout_rejected() {
        let error = ServiceConfig::from_toml_str("write_timeout_ms = 0").unwrap_err();
        assert!(matches!(error, ServiceError::Config(_)));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(ServiceConfig::from_toml_str("write_timeout_ms = \"soon\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "write_timeout_ms = 250").unwrap();
        writeln!(file, "prefer_subscription_on_read = false").unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.write_timeout(), Duration::from_millis(250));
        assert!(!config.prefer_subscription_on_read);
    }

    #[test]
    fn builder_round_trips_through_toml() {
        let config = ServiceConfig::new()
            .with_write_timeout(Duration::from_millis(1500))
            .with_model_code_index(false);
        let raw = toml::to_string(&config).unwrap();
        assert_eq!(ServiceConfig::from_toml_str(&raw).unwrap(), config);
    }
}
