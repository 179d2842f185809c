use crate::settings::config::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Loads and saves the TOML settings file. Settings are read once per
/// process; a turn only ever sees the `Settings` value it was built with.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_path: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Create a new settings manager with default settings location
    pub fn new() -> Result<Self> {
        Self::from_path(Self::default_settings_path()?)
    }

    /// Create a settings manager from a specific path
    pub fn from_path(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            write_settings(&path, &Settings::default())?;
        }

        let settings = Self::load_from_file_with_backup(&path)?;

        Ok(Self {
            settings_path: path,
            settings,
        })
    }

    /// Get the default settings path (~/.mfcs/settings.toml)
    pub fn default_settings_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".mfcs").join("settings.toml"))
    }

    /// Load settings from a TOML file with backup on parse failure
    fn load_from_file_with_backup(path: &Path) -> Result<Settings> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {path:?}"))?;

        match toml::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(?path, error = %e, "Settings file is corrupted, restoring defaults");
                let backup_path = path.with_extension("toml.backup");
                fs::rename(path, &backup_path).with_context(|| {
                    format!("Failed to backup corrupted settings to {backup_path:?}")
                })?;

                let default_settings = Settings::default();
                write_settings(path, &default_settings)?;
                Ok(default_settings)
            }
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    /// Save provided settings
    pub fn save_settings(&mut self, settings: Settings) -> Result<()> {
        write_settings(&self.settings_path, &settings)?;
        self.settings = settings;
        Ok(())
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {parent:?}"))?;
    }
    let contents = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(path, contents).with_context(|| format!("Failed to write settings to {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let manager = SettingsManager::from_path(path.clone()).unwrap();

        assert!(path.exists());
        assert_eq!(manager.settings(), &Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "log_level = \"debug\"\n\n[agent]\ncall_tag = \"agent_call\"\nid_field = \"agent_id\"\nresult_tag = \"agent_result\"\nlist_tag = \"agents\"\n",
        )
        .unwrap();

        let manager = SettingsManager::from_path(path).unwrap();
        let settings = manager.settings();

        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.agent.call_tag, "agent_call");
        assert_eq!(settings.tool, crate::settings::FamilyTags::tool());
    }

    #[test]
    fn test_corrupted_file_is_backed_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "this is [not toml").unwrap();

        let manager = SettingsManager::from_path(path.clone()).unwrap();

        assert_eq!(manager.settings(), &Settings::default());
        let backup = fs::read_to_string(path.with_extension("toml.backup")).unwrap();
        assert_eq!(backup, "this is [not toml");
    }

    #[test]
    fn test_save_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        let mut manager = SettingsManager::from_path(path.clone()).unwrap();

        let mut settings = Settings::default();
        settings.tool.result_tag = "tool_output".to_string();
        manager.save_settings(settings.clone()).unwrap();

        let reloaded = SettingsManager::from_path(path).unwrap();
        assert_eq!(reloaded.settings(), &settings);
    }
}
