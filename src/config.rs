//! User settings: the monthly salary and the list of expense categories.
//!
//! The settings are stored as a small JSON object, `{"salary": 0.0, "categories": [...]}`,
//! and are always read and written as a whole.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The categories a fresh install starts with.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["food", "utilities", "transport", "leisure"];

/// The persisted user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The monthly salary, used as the budget for the month's expenses.
    #[serde(default)]
    pub salary: f64,
    /// The categories a new transaction may be filed under, in display order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            salary: 0.0,
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Whether `category` is one of the configured categories.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|name| name == category)
    }
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.map(str::to_owned).to_vec()
}

/// Reads and writes the [Config] file at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store for the config file at `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The location of the config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config from disk.
    ///
    /// If there is no config file yet, the default config is written to disk and returned.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidConfig] if the file is not a valid config,
    /// - or [Error::ConfigIo] if the file could not be read or the default could not be written.
    pub fn load(&self) -> Result<Config, Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "No config found at {}, creating one with the default settings",
                    self.path.display()
                );
                let config = Config::default();
                self.save(&config)?;
                return Ok(config);
            }
            Err(error) => return Err(self.io_error(error)),
        };

        serde_json::from_str(&text).map_err(|error| Error::InvalidConfig {
            path: self.path.display().to_string(),
            reason: error.to_string(),
        })
    }

    /// Overwrite the config file with `config`.
    ///
    /// The new contents are written to a sibling file which then replaces the
    /// config file, so an interrupted save leaves the previous config intact.
    ///
    /// # Errors
    /// Returns [Error::ConfigIo] if the file could not be written.
    pub fn save(&self, config: &Config) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(config).map_err(|error| Error::ConfigIo {
            path: self.path.display().to_string(),
            reason: error.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }

        let mut staging_path = self.path.clone().into_os_string();
        staging_path.push(".tmp");
        let staging_path = PathBuf::from(staging_path);

        fs::write(&staging_path, text).map_err(|error| self.io_error(error))?;
        fs::rename(&staging_path, &self.path).map_err(|error| self.io_error(error))?;

        tracing::debug!("Saved config to {}", self.path.display());

        Ok(())
    }

    fn io_error(&self, error: std::io::Error) -> Error {
        tracing::error!("Config file error for {}: {error}", self.path.display());

        Error::ConfigIo {
            path: self.path.display().to_string(),
            reason: error.to_string(),
        }
    }
}

/// Parse the text entered for the monthly salary.
///
/// # Errors
/// Returns [Error::InvalidSalary] if `text` is not a finite, non-negative number.
pub fn parse_salary(text: &str) -> Result<f64, Error> {
    match text.trim().parse::<f64>() {
        Ok(salary) if salary.is_finite() && salary >= 0.0 => Ok(salary),
        _ => Err(Error::InvalidSalary(text.to_owned())),
    }
}

/// Parse a comma separated list of category names.
///
/// Names are trimmed, blank entries are skipped and repeated names are only kept once,
/// in the position they first appeared.
///
/// # Errors
/// Returns [Error::EmptyCategoryList] if no names remain.
pub fn parse_category_list(text: &str) -> Result<Vec<String>, Error> {
    let mut categories: Vec<String> = Vec::new();

    for name in text.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if !categories.iter().any(|existing| existing == name) {
            categories.push(name.to_owned());
        }
    }

    if categories.is_empty() {
        return Err(Error::EmptyCategoryList);
    }

    Ok(categories)
}
