//! Connection settings for a transfer manager.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tokio::fs;

use synclink_common::{Error, Result};

/// Backend connection settings.
///
/// The provider configuration is opaque to the transfer layer and handed
/// unchanged to the provider's store factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Registered provider name (e.g., "local", "dual-local").
    pub provider: String,
    /// Provider-specific configuration.
    #[serde(default)]
    pub config: Value,
}

impl TransferSettings {
    /// Create settings for a provider.
    pub fn new(provider: impl Into<String>, config: Value) -> Self {
        Self {
            provider: provider.into(),
            config,
        }
    }

    /// Parse settings from JSON.
    ///
    /// # Errors
    /// - Malformed JSON
    /// - Empty provider name
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    ///
    /// # Errors
    /// - File cannot be read
    /// - Same as [`TransferSettings::from_json`]
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&content)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.provider.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Provider name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_json() {
        let settings =
            TransferSettings::from_json(r#"{"provider": "local", "config": {"root": "/srv/repo"}}"#)
                .unwrap();
        assert_eq!(settings.provider, "local");
        assert_eq!(settings.config["root"], "/srv/repo");
    }

    #[test]
    fn test_config_defaults_to_null() {
        let settings = TransferSettings::from_json(r#"{"provider": "memory"}"#).unwrap();
        assert!(settings.config.is_null());
    }

    #[test]
    fn test_empty_provider_rejected() {
        let result = TransferSettings::from_json(r#"{"provider": " "}"#);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = TransferSettings::from_json("{provider");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[tokio::test]
    async fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        let settings = TransferSettings::new("memory", Value::Null);
        std::fs::write(&path, settings.to_json().unwrap()).unwrap();

        assert_eq!(TransferSettings::from_file(&path).await.unwrap(), settings);

        let missing = TransferSettings::from_file(temp.path().join("absent.json")).await;
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
