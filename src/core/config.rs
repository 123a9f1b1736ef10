//! Configuration module for `course_compass`

use crate::core::clustering::artifact::TrainingMode;
use crate::core::clustering::kmeans::{KMeans, DEFAULT_RESTARTS, DEFAULT_SEED};
use crate::core::clustering::training::{TrainingOptions, DEFAULT_CAPSTONE_CODE};
use crate::core::ranking::{RankingOptions, DEFAULT_MAX_RESULTS, DEFAULT_SUPPLEMENTAL_LIMIT};
use crate::core::recommender::RecommenderOptions;
use crate::core::similarity::DEFAULT_PEER_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Variable expanded to the configuration directory in path values
const DIR_VARIABLE: &str = "$COURSE_COMPASS";

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Input data locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Course catalog CSV
    #[serde(default)]
    pub catalog_file: String,
    /// Prerequisite CSV
    #[serde(default)]
    pub prerequisites_file: String,
    /// Transcript CSV
    #[serde(default)]
    pub transcripts_file: String,
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

const fn default_restarts() -> usize {
    DEFAULT_RESTARTS
}

/// Model training and storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model artifact JSON file
    #[serde(default)]
    pub artifact_file: String,
    /// Training population: `capstone-graduates` or `all`
    #[serde(default)]
    pub training_mode: String,
    /// K-means seed
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// K-means restarts
    #[serde(default = "default_restarts")]
    pub restarts: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_file: String::new(),
            training_mode: String::new(),
            seed: DEFAULT_SEED,
            restarts: DEFAULT_RESTARTS,
        }
    }
}

const fn default_peer_count() -> usize {
    DEFAULT_PEER_COUNT
}

const fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Recommendation query settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Capstone (thesis) course code
    #[serde(default)]
    pub capstone_code: String,
    /// Peers kept by the similarity matcher
    #[serde(default = "default_peer_count")]
    pub peer_count: usize,
    /// Cap on returned recommendations
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            capstone_code: String::new(),
            peer_count: DEFAULT_PEER_COUNT,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Data file settings
    #[serde(default)]
    pub data: DataConfig,
    /// Model settings
    #[serde(default)]
    pub model: ModelConfig,
    /// Recommendation settings
    #[serde(default)]
    pub recommend: RecommendConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override catalog CSV
    pub catalog_file: Option<String>,
    /// Override prerequisite CSV
    pub prerequisites_file: Option<String>,
    /// Override transcript CSV
    pub transcripts_file: Option<String>,
    /// Override model artifact file
    pub artifact_file: Option<String>,
}

/// Copy `default` into `target` when `target` is empty. Returns whether it changed.
fn fill_empty(target: &mut String, default: &str) -> bool {
    if target.is_empty() && !default.is_empty() {
        default.clone_into(target);
        true
    } else {
        false
    }
}

impl Config {
    /// Get the `$COURSE_COMPASS` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/coursecompass`
    /// - macOS: `~/Library/Application Support/coursecompass`
    /// - Windows: `%APPDATA%\coursecompass`
    #[must_use]
    pub fn get_course_compass_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coursecompass")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only string fields that are empty here and non-empty in `defaults`
    /// are filled; numeric fields already take their defaults when parsed.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let merged = [
            fill_empty(&mut self.logging.level, &defaults.logging.level),
            fill_empty(&mut self.logging.file, &defaults.logging.file),
            fill_empty(&mut self.data.catalog_file, &defaults.data.catalog_file),
            fill_empty(&mut self.data.prerequisites_file, &defaults.data.prerequisites_file),
            fill_empty(&mut self.data.transcripts_file, &defaults.data.transcripts_file),
            fill_empty(&mut self.model.artifact_file, &defaults.model.artifact_file),
            fill_empty(&mut self.model.training_mode, &defaults.model.training_mode),
            fill_empty(&mut self.recommend.capstone_code, &defaults.recommend.capstone_code),
        ];
        merged.contains(&true)
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Only non-`None` values replace config values; the file on disk is
    /// not modified.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file = Self::expand_variables(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }
        if let Some(path) = &overrides.catalog_file {
            self.data.catalog_file = Self::expand_variables(path);
        }
        if let Some(path) = &overrides.prerequisites_file {
            self.data.prerequisites_file = Self::expand_variables(path);
        }
        if let Some(path) = &overrides.transcripts_file {
            self.data.transcripts_file = Self::expand_variables(path);
        }
        if let Some(path) = &overrides.artifact_file {
            self.model.artifact_file = Self::expand_variables(path);
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, in
    /// the directory returned by [`get_course_compass_dir`].
    ///
    /// [`get_course_compass_dir`]: Self::get_course_compass_dir
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_course_compass_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$COURSE_COMPASS` to the configuration directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_course_compass_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Missing fields use their serde defaults; `$COURSE_COMPASS` is expanded
    /// in path values.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        for path in [
            &mut config.logging.file,
            &mut config.data.catalog_file,
            &mut config.data.prerequisites_file,
            &mut config.data.transcripts_file,
            &mut config.model.artifact_file,
        ] {
            *path = Self::expand_variables(path);
        }

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// Debug builds use `DefaultCLIConfigDebug.toml`, release builds
    /// `DefaultCLIConfigRelease.toml`.
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML. The
    /// defaults are compiled into the binary and covered by tests.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from file, or create from defaults if not found
    ///
    /// - If the config file exists: load it, merge missing fields from defaults, save if anything was added
    /// - On first run: create the config directory and save the defaults
    ///
    /// Falls back to defaults if the file cannot be read or parsed.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if !config_file.exists() {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        match fs::read_to_string(&config_file).map(|content| Self::from_toml(&content)) {
            Ok(Ok(mut config)) => {
                if config.merge_defaults(&defaults) {
                    let _ = config.save();
                }
                config
            }
            _ => defaults,
        }
    }

    /// Save configuration to the user config file
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file cannot be written
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `catalog`, `prerequisites`,
    /// `transcripts`, `artifact`, `training_mode`, `seed`, `restarts`,
    /// `capstone`, `peer_count`, `max_results`. Underscores and dashes are
    /// interchangeable.
    ///
    /// # Returns
    /// - `Some(String)`: The configuration value as a string
    /// - `None`: If the key is not recognized
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match normalize_key(key).as_str() {
            "level" => self.logging.level.clone(),
            "file" => self.logging.file.clone(),
            "verbose" => self.logging.verbose.to_string(),
            "catalog" => self.data.catalog_file.clone(),
            "prerequisites" => self.data.prerequisites_file.clone(),
            "transcripts" => self.data.transcripts_file.clone(),
            "artifact" => self.model.artifact_file.clone(),
            "training_mode" => self.model.training_mode.clone(),
            "seed" => self.model.seed.to_string(),
            "restarts" => self.model.restarts.to_string(),
            "capstone" => self.recommend.capstone_code.clone(),
            "peer_count" => self.recommend.peer_count.to_string(),
            "max_results" => self.recommend.max_results.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a configuration value by key
    ///
    /// Values are validated: booleans, integers and the training mode must
    /// parse. Call [`save()`](Config::save) to persist changes.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value cannot be parsed
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let normalized = normalize_key(key);
        match normalized.as_str() {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => self.logging.verbose = parse_value(&normalized, value)?,
            "catalog" => self.data.catalog_file = value.to_string(),
            "prerequisites" => self.data.prerequisites_file = value.to_string(),
            "transcripts" => self.data.transcripts_file = value.to_string(),
            "artifact" => self.model.artifact_file = value.to_string(),
            "training_mode" => {
                value.parse::<TrainingMode>()?;
                self.model.training_mode = value.to_string();
            }
            "seed" => self.model.seed = parse_value(&normalized, value)?,
            "restarts" => self.model.restarts = parse_value(&normalized, value)?,
            "capstone" => self.recommend.capstone_code = value.to_string(),
            "peer_count" => self.recommend.peer_count = parse_value(&normalized, value)?,
            "max_results" => self.recommend.max_results = parse_value(&normalized, value)?,
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to the value in `defaults`)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match normalize_key(key).as_str() {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "catalog" => self.data.catalog_file.clone_from(&defaults.data.catalog_file),
            "prerequisites" => self
                .data
                .prerequisites_file
                .clone_from(&defaults.data.prerequisites_file),
            "transcripts" => self
                .data
                .transcripts_file
                .clone_from(&defaults.data.transcripts_file),
            "artifact" => self.model.artifact_file.clone_from(&defaults.model.artifact_file),
            "training_mode" => self.model.training_mode.clone_from(&defaults.model.training_mode),
            "seed" => self.model.seed = defaults.model.seed,
            "restarts" => self.model.restarts = defaults.model.restarts,
            "capstone" => self
                .recommend
                .capstone_code
                .clone_from(&defaults.recommend.capstone_code),
            "peer_count" => self.recommend.peer_count = defaults.recommend.peer_count,
            "max_results" => self.recommend.max_results = defaults.recommend.max_results,
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults by deleting the config file
    ///
    /// The next [`load()`](Config::load) recreates it. Succeeds if the file
    /// does not exist.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }

    /// Capstone code, falling back to the built-in default when unset
    #[must_use]
    pub fn capstone_code(&self) -> &str {
        if self.recommend.capstone_code.is_empty() {
            DEFAULT_CAPSTONE_CODE
        } else {
            &self.recommend.capstone_code
        }
    }

    /// Training options described by the `[model]` section
    ///
    /// # Errors
    /// Returns an error if `training_mode` is not a known mode
    pub fn training_options(&self) -> Result<TrainingOptions, String> {
        let mode = if self.model.training_mode.is_empty() {
            TrainingMode::default()
        } else {
            self.model.training_mode.parse()?
        };
        Ok(TrainingOptions {
            mode,
            capstone_code: self.capstone_code().to_string(),
            kmeans: KMeans::default()
                .with_seed(self.model.seed)
                .with_restarts(self.model.restarts),
        })
    }

    /// Query options described by the `[recommend]` section
    #[must_use]
    pub fn recommender_options(&self) -> RecommenderOptions {
        RecommenderOptions {
            peer_count: self.recommend.peer_count,
            ranking: RankingOptions {
                capstone_code: self.capstone_code().to_string(),
                max_results: self.recommend.max_results,
                supplemental_limit: DEFAULT_SUPPLEMENTAL_LIMIT,
            },
        }
    }
}

fn normalize_key(key: &str) -> String {
    match key.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "catalog_file" => "catalog".to_string(),
        "prerequisites_file" => "prerequisites".to_string(),
        "transcripts_file" => "transcripts".to_string(),
        "artifact_file" => "artifact".to_string(),
        "capstone_code" => "capstone".to_string(),
        other => other.to_string(),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid value for '{key}': '{value}'"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[data]")?;
        writeln!(f, "  catalog_file = \"{}\"", self.data.catalog_file)?;
        writeln!(f, "  prerequisites_file = \"{}\"", self.data.prerequisites_file)?;
        writeln!(f, "  transcripts_file = \"{}\"", self.data.transcripts_file)?;

        writeln!(f, "\n[model]")?;
        writeln!(f, "  artifact_file = \"{}\"", self.model.artifact_file)?;
        writeln!(f, "  training_mode = \"{}\"", self.model.training_mode)?;
        writeln!(f, "  seed = {}", self.model.seed)?;
        writeln!(f, "  restarts = {}", self.model.restarts)?;

        writeln!(f, "\n[recommend]")?;
        writeln!(f, "  capstone_code = \"{}\"", self.recommend.capstone_code)?;
        writeln!(f, "  peer_count = {}", self.recommend.peer_count)?;
        write!(f, "  max_results = {}", self.recommend.max_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let config = Config::from_defaults();
        assert!(!config.logging.level.is_empty());
        assert!(!config.data.catalog_file.is_empty());
        assert!(!config.model.artifact_file.is_empty());
        assert_eq!(config.capstone_code(), "CT555");
        assert_eq!(config.model.seed, 42);
        assert!(config.training_options().is_ok());
    }

    #[test]
    fn test_key_aliases() {
        let mut config = Config::default();
        config.set("catalog-file", "a.csv").expect("known key");
        assert_eq!(config.get("catalog"), Some("a.csv".to_string()));
        config.set("Peer-Count", "7").expect("known key");
        assert_eq!(config.get("peer_count"), Some("7".to_string()));
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        assert!(config.set("seed", "forty-two").is_err());
        assert!(config.set("training_mode", "sometimes").is_err());
        assert!(config.set("training_mode", "all").is_ok());
        assert!(config.set("colour", "blue").is_err());
    }

    #[test]
    fn test_missing_numeric_fields_use_defaults() {
        let config = Config::from_toml("[logging]\nlevel = \"warn\"\n").expect("valid toml");
        assert_eq!(config.model.restarts, DEFAULT_RESTARTS);
        assert_eq!(config.recommend.max_results, DEFAULT_MAX_RESULTS);
        assert!(config.data.catalog_file.is_empty());
    }

    #[test]
    fn test_recommender_options_follow_config() {
        let mut config = Config::from_defaults();
        config.set("capstone", "TH999").expect("known key");
        config.set("max_results", "5").expect("known key");
        let options = config.recommender_options();
        assert_eq!(options.ranking.capstone_code, "TH999");
        assert_eq!(options.ranking.max_results, 5);
    }
}
