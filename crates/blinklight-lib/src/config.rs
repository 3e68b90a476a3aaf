//! Application configuration — TOML-based, platform-aware paths.
//!
//! The config file declares one `[[lights]]` entry per entity. Each entry
//! binds a device serial and LED index to a display name; two entries may
//! share a serial only if they target different LED indices, since every
//! entity exclusively owns its handle/index pair.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# Blinklight configuration — changes made outside the app may be overwritten.\n\n";

/// Display name used when a light entry doesn't set one.
pub const DEFAULT_NAME: &str = "Blinkstick Square";

/// LED index used when a light entry doesn't set one.
pub const DEFAULT_INDEX: u16 = 0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Configured light entities.
    #[serde(default)]
    pub lights: Vec<LightConfig>,
}

/// One light entity: a device serial, an LED index, and a display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    /// Device serial, e.g. "BS031337-3.0". Required.
    pub serial: String,

    /// Zero-based LED index on the device. Default: 0.
    #[serde(default)]
    pub index: u16,

    /// Display name. Default: "Blinkstick Square".
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    DEFAULT_NAME.into()
}

impl LightConfig {
    pub fn new(serial: impl Into<String>) -> Self {
        LightConfig {
            serial: serial.into(),
            index: DEFAULT_INDEX,
            name: default_name(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A light entry has an empty or whitespace-only serial.
    EmptySerial { light: usize },
    /// A light entry has an empty or whitespace-only name.
    EmptyName { light: usize },
    /// Two light entries target the same serial and LED index.
    DuplicateTarget { serial: String, index: u16 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptySerial { light } => {
                write!(f, "lights[{light}]: serial cannot be empty")
            }
            ValidationError::EmptyName { light } => {
                write!(f, "lights[{light}]: name cannot be empty")
            }
            ValidationError::DuplicateTarget { serial, index } => {
                write!(
                    f,
                    "duplicate light entry for serial {serial} index {index}"
                )
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("blinklight"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from the default path, returning the config and any
    /// parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Load config from an arbitrary path, returning the config and any
    /// parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Save config to an arbitrary path atomically (write to temp file,
    /// then rename).
    ///
    /// A header comment is prepended to warn that manual edits may be
    /// overwritten.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Save config to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config directory",
            ));
        };
        self.save_to(&path)
    }

    /// Validate the entire config, collecting all errors.
    ///
    /// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all
    /// problems found.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen: Vec<(&str, u16)> = Vec::new();

        for (i, light) in self.lights.iter().enumerate() {
            let serial = light.serial.trim();
            if serial.is_empty() {
                errors.push(ValidationError::EmptySerial { light: i });
                continue;
            }
            if light.name.trim().is_empty() {
                errors.push(ValidationError::EmptyName { light: i });
            }
            let target = (serial, light.index);
            if seen.contains(&target) {
                errors.push(ValidationError::DuplicateTarget {
                    serial: serial.to_string(),
                    index: light.index,
                });
            } else {
                seen.push(target);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
