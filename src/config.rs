use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::net::transition::OutputPolicy;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Halt the remaining sequence after the first forbidden firing.
    #[serde(default)]
    pub stop_on_first_forbidden: bool,
    #[serde(default)]
    pub unmatched_output: OutputPolicy,
    /// Length of a randomly drawn sequence when none is given.
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            stop_on_first_forbidden: false,
            unmatched_output: OutputPolicy::default(),
            sequence_length: default_sequence_length(),
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_sequence_length() -> usize {
    10
}
