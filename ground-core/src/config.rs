//! Configuration for the `ground` binary.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`ground.toml` unless `--config` says otherwise)
//! 3. `GROUND_SCENARIO` / `GROUND_ADAPTERS` environment variables
//! 4. command-line flags
//!
//! ```toml
//! scenario = "conformance"
//! adapters = ["Leptos Arc Signals", "Leptos Arena Signals"]
//! echo = false
//! json = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HarnessError, Result};
use crate::scenario::Builtin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Built-in scenario to run.
    pub scenario: Builtin,
    /// Adapters to run, by name. Empty means all of them.
    pub adapters: Vec<String>,
    /// Tee scenario output to stderr while it is captured.
    pub echo: bool,
    /// Print the report as JSON instead of the text summary.
    pub json: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            scenario: Builtin::Basics,
            adapters: Vec::new(),
            echo: true,
            json: false,
        }
    }
}

impl HarnessConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!(path = %path.display(), "loading config");
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply `GROUND_SCENARIO` and `GROUND_ADAPTERS` (comma separated).
    pub fn merge_env(&mut self) -> Result<()> {
        self.merge_vars(
            std::env::var("GROUND_SCENARIO").ok(),
            std::env::var("GROUND_ADAPTERS").ok(),
        )
    }

    fn merge_vars(&mut self, scenario: Option<String>, adapters: Option<String>) -> Result<()> {
        if let Some(scenario) = scenario {
            self.scenario = scenario.parse()?;
        }
        if let Some(adapters) = adapters {
            self.adapters = adapters
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
