//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level
//! updates.

use serde::{Deserialize, Serialize};

use crate::alignment::MasterPolicy;
use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Frame alignment behavior.
    #[serde(default)]
    pub alignment: AlignmentSettings,
}

/// Path configuration for logs and recently used experiment locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Last folder an experiment was loaded from.
    #[serde(default)]
    pub last_experiment_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
            last_experiment_folder: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level to emit.
    #[serde(default)]
    pub level: LogLevel,

    /// Show timestamps in log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            show_timestamps: true,
        }
    }
}

/// Frame alignment behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignmentSettings {
    /// Treat a present ephys stream as master when no image stream exists.
    /// Off by default: ephys-only experiments have zero virtual frames
    /// until this is explicitly enabled.
    #[serde(default)]
    pub ephys_as_master: bool,
}

impl AlignmentSettings {
    /// The master policy these settings select.
    pub fn master_policy(&self) -> MasterPolicy {
        if self.ephys_as_master {
            MasterPolicy::EphysFallback
        } else {
            MasterPolicy::ImageOnly
        }
    }
}

/// Identifies one settings section for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Alignment,
}

impl ConfigSection {
    /// TOML table name of this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Alignment => "alignment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let settings = Settings::default();
        assert!(!settings.alignment.ephys_as_master);
        assert_eq!(settings.alignment.master_policy(), MasterPolicy::ImageOnly);
        assert_eq!(settings.paths.logs_folder, ".logs");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let settings: Settings = toml::from_str("[alignment]\nephys_as_master = true\n").unwrap();
        assert!(settings.alignment.ephys_as_master);
        assert_eq!(
            settings.alignment.master_policy(),
            MasterPolicy::EphysFallback
        );
        assert!(settings.logging.show_timestamps);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.alignment.ephys_as_master = true;
        settings.paths.last_experiment_folder = "/data/2026-08".to_string();

        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert!(parsed.alignment.ephys_as_master);
        assert_eq!(parsed.paths.last_experiment_folder, "/data/2026-08");
    }
}
