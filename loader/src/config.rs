use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Glob was invalid")]
    InvalidGlobs(#[from] globset::Error),
    #[error("Failed to read config file")]
    ReadFailed(#[from] std::io::Error),
    #[error("Failed to parse config file")]
    InvalidYaml(#[from] serde_yaml::Error),
    #[error("Config failed preflight checks")]
    PreflightFailed,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    // Glob matched against file names, only matching files are read as result batches
    #[serde(default = "default_glob")]
    pub glob: String,
    // Sort directory entries by file name instead of using the listing order
    #[serde(default)]
    pub sort: bool,
    // Text written for absent fields when exporting
    #[serde(default = "default_missing_marker")]
    pub missing_marker: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            glob: default_glob(),
            sort: false,
            missing_marker: default_missing_marker(),
        }
    }
}

impl LoaderConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigErrors> {
        debug!(path = ?path, "Loading config");

        let config = serde_yaml::from_reader(BufReader::new(File::open(path)?))?;

        Ok(config)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigErrors> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Compile the file name glob
    pub fn compile_glob(&self) -> Result<GlobMatcher, ConfigErrors> {
        Ok(GlobBuilder::new(&self.glob)
            .literal_separator(true)
            .build()?
            .compile_matcher())
    }

    /// Returns true if any problem was found, every problem is logged before returning
    pub fn preflight_checks(&self) -> bool {
        let mut contains_error = false;

        if let Err(e) = self.compile_glob() {
            error!("glob '{}' does not compile: {e}", self.glob);
            contains_error = true;
        } else if !self.glob.ends_with(".json") {
            warn!(
                "glob '{}' may match files that are not JSON, these will fail to parse",
                self.glob
            );
        }

        if self.missing_marker.is_empty() {
            error!("missing_marker cannot be empty, absent fields would be indistinguishable from empty strings");
            contains_error = true;
        }

        contains_error
    }

    /// load from an optional path and run the preflight checks
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigErrors> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        if config.preflight_checks() {
            Err(ConfigErrors::PreflightFailed)
        } else {
            Ok(config)
        }
    }
}

fn default_glob() -> String {
    String::from("*.json")
}

fn default_missing_marker() -> String {
    String::from(crate::schema::MISSING_MARKER)
}
