use color_eyre::eyre::{eyre, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::{Preferences, PreferencesFile};

const CONFIG_DIR: &str = ".config/mqttdeck";
const PREFERENCES_FILE: &str = "preferences.toml";

/// File-backed store for [`Preferences`]. Loaded once at startup and
/// written back at shutdown.
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new() -> Self {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);
        path.push(PREFERENCES_FILE);
        Self { path }
    }

    /// Store rooted at an explicit file path instead of the user config dir.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads preferences from disk. A missing file is normal on first run;
    /// that and any read or parse failure fall back to defaults.
    pub fn load(&self) -> Preferences {
        if !self.path.exists() {
            debug!("No preferences file at {}, using defaults", self.path.display());
            return Preferences::default();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return Preferences::default();
            }
        };

        match toml::from_str::<PreferencesFile>(&content) {
            Ok(file) => Preferences::from(file),
            Err(e) => {
                warn!("Failed to parse {}: {}", self.path.display(), e);
                Preferences::default()
            }
        }
    }

    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }

        let content = toml::to_string_pretty(&PreferencesFile::from(preferences))
            .map_err(|e| eyre!("Failed to serialize preferences: {}", e))?;

        fs::write(&self.path, content)
            .map_err(|e| eyre!("Failed to write preferences file: {}", e))?;

        info!("Preferences saved to {}", self.path.display());
        Ok(())
    }
}

impl Default for PreferencesStore {
    fn default() -> Self {
        Self::new()
    }
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> PreferencesStore {
        let mut path = std::env::temp_dir();
        path.push(format!("mqttdeck-test-{}-{}", std::process::id(), name));
        path.push(PREFERENCES_FILE);
        PreferencesStore::with_path(path)
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store("roundtrip");
        let preferences = Preferences {
            brokers: vec![
                "broker-a".to_string(),
                "broker-b".to_string(),
                "broker-c".to_string(),
            ],
            broker_port: 8883,
        };

        store.save(&preferences).expect("save preferences");
        let loaded = store.load();

        assert_eq!(loaded, preferences);
    }

    #[test]
    fn load_without_file_yields_defaults() {
        let store = temp_store("missing");
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let store = temp_store("corrupt");
        fs::create_dir_all(store.path.parent().unwrap()).unwrap();
        fs::write(&store.path, "not = [valid").unwrap();

        assert_eq!(store.load(), Preferences::default());
    }
}
