//! Engine configuration.
//!
//! Everything the page used to declare as element attributes (debounce
//! interval, CSRF names, button targets) lives here as typed values, loaded
//! from TOML. Every field has a default, so an empty file is valid.

mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub use error::ConfigError;

use crate::actions::ButtonConfig;
use crate::save::MissingStatusPolicy;

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period after the last change before an autosave fires.
    pub debounce_ms: u64,
    /// How long the "saved" indicator stays up before reverting to idle.
    pub saved_display_ms: u64,
    /// Whole-request timeout for a save.
    pub request_timeout_secs: u64,
    /// Connection timeout for a save.
    pub connect_timeout_secs: u64,
    /// Cookie holding the CSRF token.
    pub csrf_cookie_name: String,
    /// Form field the CSRF token is sent in.
    pub csrf_field_name: String,
    /// Value of the `X-Requested-With` header on programmatic saves.
    pub requested_with_header: String,
    /// Handling of structured responses without a `status` field.
    pub missing_status: MissingStatusPolicy,
    /// Advisory delay before a same-tab redirect after a manual save.
    pub redirect_delay_ms: u64,
    /// Buttons declared by the page.
    pub buttons: Vec<ButtonConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1200,
            saved_display_ms: 2000,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            csrf_cookie_name: "csrftoken".to_string(),
            csrf_field_name: "csrfmiddlewaretoken".to_string(),
            requested_with_header: "XMLHttpRequest".to_string(),
            missing_status: MissingStatusPolicy::default(),
            redirect_delay_ms: 500,
            buttons: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `<config_dir>/rtms_sync/config.toml`, or defaults if it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.is_file() {
            Self::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Returns the default configuration file location.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("rtms_sync").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("debounce_ms", self.debounce_ms),
            ("request_timeout_secs", self.request_timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Invalid {
                field: *field,
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.csrf_field_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "csrf_field_name",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(button) = self.buttons.iter().find(|b| b.form_id.is_empty()) {
            return Err(ConfigError::Invalid {
                field: "buttons.form_id",
                reason: format!("button {:?} has an empty form id", button.action),
            });
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn saved_display(&self) -> Duration {
        Duration::from_millis(self.saved_display_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}
