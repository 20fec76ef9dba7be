//! User-facing settings consumed by the core, persisted as pretty JSON next
//! to the database.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    /// Context-similarity percentage below which icon reuse is flagged.
    pub similarity_threshold: u8,
    /// Asset format for icon embeds.
    pub icon_format: String,
    /// Copy the existing file to `.bak` before overwriting on save.
    pub auto_backup: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 50,
            icon_format: "svg".into(),
            auto_backup: true,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn current(&self) -> UserSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, mut settings: UserSettings) -> Result<()> {
        settings.similarity_threshold = settings.similarity_threshold.min(100);
        let mut guard = self.data.write().unwrap();
        *guard = settings;
        self.persist(&guard)
    }

    pub fn set_similarity_threshold(&self, threshold: u8) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.similarity_threshold = threshold.min(100);
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: UserSettings = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}
