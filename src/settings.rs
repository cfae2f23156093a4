use crate::dashboard::persistence::ImportMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Folder holding the durable slots. If `None`, a platform data folder is
    /// used.
    #[serde(default)]
    pub data_dir: Option<String>,
    /// Default destination for exports when none is given on the command line.
    #[serde(default)]
    pub export_dir: Option<String>,
    /// Reject an import outright when any widget is malformed or an id repeats.
    /// When false such widgets are dropped with a warning instead.
    #[serde(default = "default_strict_import")]
    pub strict_import: bool,
}

fn default_strict_import() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            data_dir: None,
            export_dir: None,
            strict_import: default_strict_import(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs_next::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("dashboard_editor"),
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        match &self.export_dir {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn import_mode(&self) -> ImportMode {
        if self.strict_import {
            ImportMode::Strict
        } else {
            ImportMode::Lenient
        }
    }
}
