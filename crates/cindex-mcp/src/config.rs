//! Process-level configuration: wraps [`cindex_config::ApplicationConfig`]
//! with the ambient settings that only make sense for this binary (log
//! directory). TOML file load, env overrides, and CLI overrides compose in
//! that order, matching `ApplicationConfig::with_profile`'s own layering.

use std::path::PathBuf;

use cindex_config::{ApplicationConfig, Profile};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(flatten)]
    pub application: ApplicationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            application: ApplicationConfig::with_profile(Profile::Development),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}
