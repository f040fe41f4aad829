//! INI file configuration adapter.

use crate::domain::error::TradelabError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradelabError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| TradelabError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TradelabError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradelabError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn invalid(section: &str, key: &str, reason: String) -> TradelabError {
        TradelabError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TradelabError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| Self::invalid(section, key, format!("'{}' is not an integer", raw))),
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, TradelabError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| Self::invalid(section, key, format!("'{}' is not a number", raw))),
        }
    }
}
