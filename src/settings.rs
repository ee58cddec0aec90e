//! Boot configuration.
//!
//! Read from `settings.json` in the working directory, or from the file
//! named by `TICKBOX_SETTINGS`. A missing file means defaults; a broken
//! one is an error rather than a silent fallback.

use std::fs;

use serde::Deserialize;

const SETTINGS_FILENAME: &str = "settings.json";
const SETTINGS_ENV: &str = "TICKBOX_SETTINGS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    /// Path of the redb task file.
    pub data_path: String,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            data_path: "tickbox.redb".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Settings, SettingsError> {
        let path = std::env::var(SETTINGS_ENV).unwrap_or_else(|_| SETTINGS_FILENAME.to_string());
        Settings::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Settings, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default());
            }
            Err(e) => return Err(SettingsError::Io(path.to_string(), e.to_string())),
        };
        serde_json::from_str(&content)
            .map_err(|e| SettingsError::Parse(path.to_string(), e.to_string()))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(String, String),
    Parse(String, String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(path, e) => write!(f, "cannot read {path}: {e}"),
            SettingsError::Parse(path, e) => write!(f, "cannot parse {path}: {e}"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
