//! Error types shared across the harness.
//!
//! Two layers of failure exist:
//!
//! - [`HarnessError`]: wiring problems in the harness itself (no adapter
//!   installed, unknown adapter name, bad config file). These abort the
//!   operation that hit them.
//! - [`AdapterError`]: a lifecycle hook of one adapter failed. The runner
//!   turns these into a failed [`TestResult`](crate::harness::TestResult)
//!   for that adapter only and moves on to the next one.
//!
//! Scenario failures have their own type, see
//! [`ScenarioError`](crate::scenario::ScenarioError).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the harness plumbing.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A primitive was requested while the active slot was empty.
    #[error("no implementation installed: call ActiveSlot::install() before `{0}`")]
    NoImplementation(&'static str),

    /// Registry lookup by name found nothing.
    #[error("adapter `{0}` is not registered")]
    AdapterNotFound(String),

    /// Registry already holds an adapter with this (case-insensitive) name.
    #[error("adapter `{0}` is already registered")]
    DuplicateAdapter(String),

    /// A run was started against a registry with no adapters in it.
    #[error("the adapter registry is empty")]
    EmptyRegistry,

    /// No built-in scenario has this name.
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure of an adapter's `setup` or `teardown` hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("teardown failed: {0}")]
    Teardown(String),
}

/// Result alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
