//! Gate configuration
//!
//! Every user-visible string lives in [`PromptTexts`] so hosts can ship
//! translations. The whole config round-trips through JSON; missing keys
//! fall back to the English defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::policy::Rejection;
use crate::store::{FileSecretStore, SecretKey};

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration directory name
const CONFIG_DIR_NAME: &str = "pin-gate";

/// Texts shown in prompts and the biometric sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTexts {
    pub setup_title: String,
    pub setup_message: String,
    pub reset_title: String,
    pub reset_message: String,
    pub verify_title: String,
    pub verify_message: String,

    pub pin_label: String,
    pub confirm_label: String,
    pub old_pin_label: String,
    pub new_pin_label: String,
    pub confirm_new_label: String,

    pub empty_pin: String,
    pub pins_must_match: String,
    pub same_as_old: String,
    pub invalid_old: String,
    pub incorrect_pin: String,

    /// Reason passed to the biometric sheet
    pub biometric_reason: String,
}

impl Default for PromptTexts {
    fn default() -> Self {
        Self {
            setup_title: "PIN Setup".to_string(),
            setup_message: "Please enter your new PIN.".to_string(),
            reset_title: "PIN Reset".to_string(),
            reset_message: "Please enter your old and new PIN.".to_string(),
            verify_title: "PIN Alert".to_string(),
            verify_message: "Please enter your PIN to proceed.".to_string(),

            pin_label: "PIN".to_string(),
            confirm_label: "Confirm PIN".to_string(),
            old_pin_label: "Old PIN".to_string(),
            new_pin_label: "New PIN".to_string(),
            confirm_new_label: "Confirm new PIN".to_string(),

            empty_pin: "PIN cannot be empty!".to_string(),
            pins_must_match: "PINs must match!".to_string(),
            same_as_old: "New PIN must be different from the old one!".to_string(),
            invalid_old: "The old PIN you entered was invalid!".to_string(),
            incorrect_pin: "Entered PIN was incorrect.".to_string(),

            biometric_reason: "Authentication is needed to perform this action.".to_string(),
        }
    }
}

impl PromptTexts {
    /// Reason text for a setup or reset rejection
    pub fn rejection(&self, rejection: Rejection) -> &str {
        match rejection {
            Rejection::EmptyInput => &self.empty_pin,
            Rejection::Mismatch => &self.pins_must_match,
            Rejection::SameAsOld => &self.same_as_old,
            Rejection::InvalidOld => &self.invalid_old,
        }
    }

    /// Reason text for a rejected verification round
    pub fn verify_rejection(&self, rejection: Rejection) -> &str {
        match rejection {
            Rejection::EmptyInput => &self.empty_pin,
            _ => &self.incorrect_pin,
        }
    }

    /// Compose a retry message: instruction, blank line, reason
    pub fn retry_message(base: &str, reason: &str) -> String {
        format!("{}\n\n{}", base, reason)
    }
}

/// Gate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Prompt and biometric texts
    #[serde(default)]
    pub texts: PromptTexts,

    /// Identity of the stored secret
    #[serde(default)]
    pub secret_key: SecretKey,

    /// Record path for the file-backed store
    #[serde(default = "FileSecretStore::default_path")]
    pub store_path: PathBuf,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            texts: PromptTexts::default(),
            secret_key: SecretKey::default(),
            store_path: FileSecretStore::default_path(),
        }
    }
}

impl GateConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path`, or defaults if it is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config file: {}", e);
            Self::default()
        })
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// File-backed store at the configured location
    pub fn file_store(&self) -> FileSecretStore {
        FileSecretStore::new(self.store_path.clone(), self.secret_key.clone())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_texts() {
        let texts = PromptTexts::default();
        assert_eq!(texts.rejection(Rejection::Mismatch), "PINs must match!");
        assert_eq!(
            texts.verify_rejection(Rejection::Mismatch),
            "Entered PIN was incorrect."
        );
        assert_eq!(
            texts.verify_rejection(Rejection::EmptyInput),
            "PIN cannot be empty!"
        );
    }

    #[test]
    fn test_retry_message() {
        assert_eq!(
            PromptTexts::retry_message("Please enter your new PIN.", "PINs must match!"),
            "Please enter your new PIN.\n\nPINs must match!"
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "texts": { "setup_title": "Code PIN" } }"#;
        let config: GateConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.texts.setup_title, "Code PIN");
        assert_eq!(config.texts.reset_title, "PIN Reset");
        assert_eq!(config.secret_key, SecretKey::default());
        assert_eq!(config.store_path, FileSecretStore::default_path());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("conf").join("config.json");

        let mut config = GateConfig::default();
        config.texts.verify_title = "Unlock".to_string();
        config.store_path = temp_dir.path().join("secret.json");
        config.save(&path).unwrap();

        let loaded = GateConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.file_store().path(), temp_dir.path().join("secret.json"));
    }

    #[test]
    fn test_broken_config_falls_back() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{").unwrap();

        assert!(matches!(GateConfig::load(&path), Err(ConfigError::Parse(_))));
        assert_eq!(GateConfig::load_or_default(&path), GateConfig::default());
        assert_eq!(
            GateConfig::load_or_default(&temp_dir.path().join("missing.json")),
            GateConfig::default()
        );
    }
}
