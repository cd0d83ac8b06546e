use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

pub const DEFAULT_CONVERTER: &str = "./bin/ftconv";
pub const DEFAULT_WORKSPACE: &str = "tmp/torture";

/// What a failed converter invocation means for the run as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    /// Print the failure and keep going. The run always succeeds.
    #[default]
    Ignore,
    /// Keep going, but fail the run at the end if anything failed
    ExitCode,
    /// Stop at the first failure
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TortureConfig {
    pub converter: PathBuf,
    pub workspace: PathBuf,
    pub on_failure: FailureMode,
}

impl Default for TortureConfig {
    fn default() -> Self {
        TortureConfig {
            converter: PathBuf::from(DEFAULT_CONVERTER),
            workspace: PathBuf::from(DEFAULT_WORKSPACE),
            on_failure: FailureMode::default(),
        }
    }
}

impl TortureConfig {
    pub fn from_yaml(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        
        Ok(serde_yaml::from_str(source)?)
    }
    
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Could not open config file {}", path.display()))?;
        
        Self::from_yaml(&source)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}
