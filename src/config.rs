use crate::error::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Low temperature keeps drafts close to the source notes.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftingSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Default for DraftingSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

/// Locally held drafting credential and settings, backed by a JSON file.
///
/// Nothing is written until [`CredentialStore::save`] is called.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    settings: DraftingSettings,
}

impl CredentialStore {
    /// Reads the store at `path`. A missing file yields empty settings.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let settings = if path.exists() {
            let json = fs::read_to_string(&path)?;
            info!("Loaded drafting settings from {}", path.display());
            serde_json::from_str(&json)?
        } else {
            debug!("No settings file at {}, using defaults", path.display());
            DraftingSettings::default()
        };

        Ok(Self { path, settings })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.settings)?)?;
        info!("Saved drafting settings to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &DraftingSettings {
        &self.settings
    }

    /// The `GEMINI_API_KEY` environment variable wins over the stored key.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.stored_api_key().map(str::to_string))
    }

    pub fn stored_api_key(&self) -> Option<&str> {
        self.settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.settings.api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());
    }

    pub fn clear_api_key(&mut self) {
        self.settings.api_key = None;
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.settings.model = model.into();
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.settings.temperature = temperature.clamp(0.0, 2.0);
    }
}
