use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::merge::matching::MatchOptions;

const DEFAULT_FILE: &str = "mdmerge";
const ENV_PREFIX: &str = "MDMERGE";

/// Settings read from `mdmerge.toml` (or `--config`) and `MDMERGE_*` variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Template file; the bundled template when unset.
    pub template: Option<PathBuf>,
    pub require_same_level: bool,
    pub case_sensitive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let options = MatchOptions::default();
        Self {
            template: None,
            require_same_level: options.require_same_level,
            case_sensitive: options.case_sensitive,
        }
    }
}

impl Settings {
    /// An explicit `path` must exist; the default `mdmerge.*` file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("loading settings")?
            .try_deserialize()
            .context("invalid settings")
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            require_same_level: self.require_same_level,
            case_sensitive: self.case_sensitive,
        }
    }
}
