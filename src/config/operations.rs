//! Config loading and validation.

use super::model::Config;
use crate::error::{LockSpoolError, Result};
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(LockSpoolError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockSpoolError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            LockSpoolError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LockSpoolError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `spool_dir` must be an absolute path
    /// - `quarantine_prefix` must be non-empty and contain no `/`
    /// - `link_eviction_limit` must be positive
    pub fn validate(&self) -> Result<()> {
        if !self.spool_dir.is_absolute() {
            return Err(LockSpoolError::UserError(format!(
                "config validation failed: spool_dir must be absolute (found '{}')",
                self.spool_dir.display()
            )));
        }

        if self.quarantine_prefix.is_empty() {
            return Err(LockSpoolError::UserError(
                "config validation failed: quarantine_prefix must be non-empty".to_string(),
            ));
        }
        if self.quarantine_prefix.contains('/') {
            return Err(LockSpoolError::UserError(format!(
                "config validation failed: quarantine_prefix must not contain '/' (found '{}')",
                self.quarantine_prefix
            )));
        }

        if self.link_eviction_limit == 0 {
            return Err(LockSpoolError::UserError(
                "config validation failed: link_eviction_limit must be greater than 0"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
