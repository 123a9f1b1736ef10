//! CLI argument definitions for `coursecompass`

use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use course_compass::core::clustering::TrainingMode;
use course_compass::logger::Level;
use course_compass::ConfigOverrides;

/// CLI log level argument
///
/// Converts to lowercase strings for config storage and to `logger::Level`
/// for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

/// Training population selectable from the command line
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum TrainingModeArg {
    /// On-time graduates who passed the capstone
    CapstoneGraduates,
    /// Every student in the population
    All,
}

impl From<TrainingModeArg> for TrainingMode {
    fn from(arg: TrainingModeArg) -> Self {
        match arg {
            TrainingModeArg::CapstoneGraduates => Self::CapstoneGraduates,
            TrainingModeArg::All => Self::All,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `catalog`, `peer_count`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

/// Options shared by the per-student query commands
#[derive(Debug, clap::Args)]
pub struct StudentQuery {
    /// Student identifier
    #[arg(value_name = "STUDENT")]
    pub student_id: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Train the clustering model from the transcript population.
    ///
    /// Writes a new artifact version; the previous artifact is kept on failure.
    Train {
        /// Training population (defaults to config `training_mode`)
        #[arg(long, value_enum)]
        mode: Option<TrainingModeArg>,

        /// Random seed for k-means (defaults to config `seed`)
        #[arg(long)]
        seed: Option<u64>,

        /// Number of k-means restarts (defaults to config `restarts`)
        #[arg(long)]
        restarts: Option<usize>,
    },
    /// Recommend courses for the next semesters.
    Recommend {
        #[command(flatten)]
        query: StudentQuery,

        /// Include credit progress with the recommendations
        #[arg(long)]
        progress: bool,
    },
    /// Show one study plan per cluster, nearest cluster first.
    Plans {
        #[command(flatten)]
        query: StudentQuery,
    },
    /// Show the distance from a student to every cluster centroid.
    Distances {
        #[command(flatten)]
        query: StudentQuery,
    },
    /// Show a student's credit progress.
    Progress {
        #[command(flatten)]
        query: StudentQuery,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "coursecompass",
    about = "Course recommendations and study plans from peer transcripts",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override the course catalog CSV
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Override the prerequisite CSV
    #[arg(long, value_name = "FILE")]
    pub prerequisites: Option<PathBuf>,

    /// Override the transcript CSV
    #[arg(long, value_name = "FILE")]
    pub transcripts: Option<PathBuf>,

    /// Override the model artifact file
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Subcommand to execute.
    /// A subcommand is required to run the CLI.
    #[command(subcommand)]
    pub command: Command,
}

fn path_string(path: Option<&PathBuf>) -> Option<String> {
    path.map(|p| p.to_string_lossy().to_string())
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// # Returns
    /// A `ConfigOverrides` struct with values from CLI flags, where `None` means no override.
    ///
    /// # Examples
    /// ```ignore
    /// let args = Cli::parse();
    /// let overrides = args.to_config_overrides();
    /// config.apply_overrides(&overrides);
    /// ```
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: path_string(self.config_log_file.as_ref()),
            verbose: self.config_verbose,
            catalog_file: path_string(self.catalog.as_ref()),
            prerequisites_file: path_string(self.prerequisites.as_ref()),
            transcripts_file: path_string(self.transcripts.as_ref()),
            artifact_file: path_string(self.model.as_ref()),
        }
    }
}
