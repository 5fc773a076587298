use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("toml serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    /// Endpoint the form snapshot is POSTed to for command computation.
    pub preview_url: String,
    /// Directory holding the durable field store.
    pub data_dir: PathBuf,
    /// Directory scanned for connector registry overlay files.
    pub connectors_dir: PathBuf,
}

fn base_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".cmdrig"))
        .unwrap_or_else(|_| PathBuf::from(".cmdrig"))
}

impl Default for AppSettings {
    fn default() -> Self {
        let base = base_dir();
        Self {
            preview_url: "http://127.0.0.1:5000/preview".to_string(),
            data_dir: base.clone(),
            connectors_dir: base.join("connectors"),
        }
    }
}

impl AppSettings {
    pub fn default_path() -> PathBuf {
        base_dir().join("settings.toml")
    }

    pub fn fields_path(&self) -> PathBuf {
        self.data_dir.join("fields.json")
    }

    /// Loads settings, writing the defaults back when the file is missing so
    /// operators have something to edit. A malformed file falls back to
    /// defaults without overwriting it.
    pub fn load_or_create(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => match toml::from_str(&data) {
                Ok(settings) => settings,
                Err(err) => {
                    log::warn!(
                        "settings file {} is malformed, using defaults: {err}",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                let settings = Self::default();
                if let Err(err) = settings.save(path) {
                    log::warn!(
                        "could not write default settings to {}: {err}",
                        path.display()
                    );
                }
                settings
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let data = toml::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
