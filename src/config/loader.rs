//! Country settings loading functionality.
//!
//! This module provides the [`CountrySettingsLoader`] type, the Country
//! Settings provider the rest of the engine depends on. Settings live in a
//! directory of YAML files, one per country.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::CountrySettings;

/// Loads and provides access to per-country payroll settings.
///
/// # Directory Structure
///
/// The configuration directory holds one YAML file per country:
/// ```text
/// config/countries/
/// ├── ph.yaml
/// ├── sg.yaml
/// └── us.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payrun_engine::config::CountrySettingsLoader;
///
/// let loader = CountrySettingsLoader::load("./config/countries").unwrap();
/// let ph = loader.get("PH").unwrap();
/// println!("Divisor: {}", ph.days_per_month);
/// ```
#[derive(Debug, Clone)]
pub struct CountrySettingsLoader {
    settings: HashMap<String, CountrySettings>,
}

impl CountrySettingsLoader {
    /// Loads settings from every `.yaml` file in the specified directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the directory does not exist and
    /// `ConfigParseError` if any file fails to parse.
    pub fn load(dir: impl AsRef<Path>) -> EngineResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(EngineError::ConfigNotFound {
                path: dir.display().to_string(),
            });
        }

        let entries = fs::read_dir(dir).map_err(|e| EngineError::ConfigParseError {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut settings = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| EngineError::ConfigParseError {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }

            let contents = fs::read_to_string(&path).map_err(|e| EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let parsed: CountrySettings =
                serde_yaml::from_str(&contents).map_err(|e| EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            settings.insert(parsed.country.clone(), parsed);
        }

        Ok(Self { settings })
    }

    /// Builds a loader from already-constructed settings.
    ///
    /// Used by tests and callers that source settings from elsewhere.
    pub fn from_settings(entries: impl IntoIterator<Item = CountrySettings>) -> Self {
        Self {
            settings: entries
                .into_iter()
                .map(|s| (s.country.clone(), s))
                .collect(),
        }
    }

    /// Returns the settings for a country code.
    ///
    /// # Errors
    ///
    /// Returns `CountryNotConfigured` if the country has no settings file.
    pub fn get(&self, country: &str) -> EngineResult<&CountrySettings> {
        self.settings
            .get(country)
            .ok_or_else(|| EngineError::CountryNotConfigured {
                country: country.to_string(),
            })
    }

    /// Returns the configured country codes.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.settings.keys().map(String::as_str)
    }
}
