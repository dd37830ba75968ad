//! Command-line arguments and application configuration.

use crate::constants::{DATA_DIR_NAME, RECENT_PROJECTS_FILE, TEMPLATES_DIR};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Exploder - drillable diagram documents
#[derive(Parser, Debug)]
#[command(name = "exploder", version)]
#[command(about = "Draw pages of linked objects and navigate them like a document")]
pub struct Cli {
    /// Project file to open on start
    pub project: Option<PathBuf>,

    /// Directory for the recent-projects list and templates
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Run a command instead of opening the editor
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Headless commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Check a project for broken references
    Validate {
        /// Project file to check
        project: PathBuf,
    },

    /// Write the viewer-only snapshot of a project
    Publish {
        /// Project file to publish
        project: PathBuf,
        /// Output file
        output: PathBuf,
    },

    /// List saved templates, installing the built-in ones if needed
    Templates,
}

/// Settings the application is started with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory for the recent-projects list and templates
    pub data_dir: PathBuf,
    /// Project to open on start
    pub initial_project: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            initial_project: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            data_dir: cli.data_dir.clone().unwrap_or_else(default_data_dir),
            initial_project: cli.project.clone(),
        }
    }

    /// Location of the recent-projects list.
    pub fn recent_projects_file(&self) -> PathBuf {
        self.data_dir.join(RECENT_PROJECTS_FILE)
    }

    /// Location of the templates directory.
    pub fn templates_dir(&self) -> PathBuf {
        self.data_dir.join(TEMPLATES_DIR)
    }
}

/// Per-user data directory, e.g. `~/.local/share/exploder` on Linux.
///
/// Falls back to `.exploder` in the working directory when the platform
/// reports no data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .unwrap_or_else(|| {
            log::warn!("No per-user data directory available, using ./.{}", DATA_DIR_NAME);
            PathBuf::from(format!(".{DATA_DIR_NAME}"))
        })
}

/// Whether `path` carries the project file extension.
pub fn is_project_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(crate::constants::PROJECT_EXTENSION))
}
