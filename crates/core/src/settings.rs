use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::document;
use crate::error::PersistenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    #[serde(rename = "System Default", other)]
    SystemDefault,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::SystemDefault => "System Default",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" | "system default" | "system-default" => Ok(Theme::SystemDefault),
            other => Err(anyhow!(
                "Unknown theme '{}': expected light|dark|system",
                other
            )),
        }
    }
}

/// User preferences persisted in the settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    pub enable_notifications: bool,
    pub app_theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_notifications: true,
            app_theme: Theme::SystemDefault,
        }
    }
}

impl Settings {
    /// Read settings, falling back to defaults when the document is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match document::read_json::<Settings>(path) {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(err) => {
                tracing::warn!(error = %err, "using default settings");
                Settings::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        document::write_json(path, self)
    }
}
