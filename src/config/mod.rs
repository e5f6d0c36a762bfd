use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::utils::{ensure_dir, write_atomic, PathResolver};
use crate::domain::household::{DEFAULT_PERSON1_NAME, DEFAULT_PERSON2_NAME};
use crate::domain::ParticipantNames;
use crate::errors::SplitError;

pub const CONFIG_KEYS: [&str; 4] = ["locale", "currency_symbol", "person1", "person2"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency_symbol: String,
    /// Names given to new sessions before anyone edits them.
    pub person1_default: String,
    pub person2_default: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency_symbol: "$".into(),
            person1_default: DEFAULT_PERSON1_NAME.into(),
            person2_default: DEFAULT_PERSON2_NAME.into(),
        }
    }
}

impl Config {
    pub fn default_names(&self) -> ParticipantNames {
        ParticipantNames::new(&self.person1_default, &self.person2_default)
    }

    pub fn get_value(&self, key: &str) -> Option<&str> {
        match key {
            "locale" => Some(&self.locale),
            "currency_symbol" | "currency" => Some(&self.currency_symbol),
            "person1" => Some(&self.person1_default),
            "person2" => Some(&self.person2_default),
            _ => None,
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), SplitError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SplitError::ConfigError(format!("`{}` cannot be empty", key)));
        }
        let slot = match key {
            "locale" => &mut self.locale,
            "currency_symbol" | "currency" => &mut self.currency_symbol,
            "person1" => &mut self.person1_default,
            "person2" => &mut self.person2_default,
            other => {
                return Err(SplitError::ConfigError(format!(
                    "unknown setting `{}` (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                )))
            }
        };
        *slot = value.to_string();
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn with_base_dir(base: PathBuf) -> Result<Self, SplitError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Missing files yield the defaults; unreadable ones are an error.
    pub fn load(&self) -> Result<Config, SplitError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            SplitError::ConfigError(format!("`{}`: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), SplitError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Participant;

    #[test]
    fn load_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set_value("locale", "es-ES").unwrap();
        config.set_value("currency", "€").unwrap();
        config.set_value("person2", "Luis").unwrap();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.locale, "es-ES");
        assert_eq!(loaded.currency_symbol, "€");
        assert_eq!(loaded.default_names().get(Participant::Person2), "Luis");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"locale":"de-DE"}"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.locale, "de-DE");
        assert_eq!(loaded.currency_symbol, "$");
    }

    #[test]
    fn rejects_unknown_keys_and_blank_values() {
        let mut config = Config::default();
        assert!(config.set_value("theme", "dark").is_err());
        assert!(config.set_value("locale", "  ").is_err());
        assert_eq!(config, Config::default());
    }
}
