//! Scenario scripts.
//!
//! A scenario is written once against a [`Scope`] and replayed by the
//! runner against every adapter. It may log freely through
//! `scope.console()` and signals failure by returning a [`ScenarioError`]
//! (or by panicking, which the runner also catches).
//!
//! Three scripts ship with the harness, see [`Builtin`].

mod basics;
mod conformance;
mod playground;

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use basics::Basics;
pub use conformance::Conformance;
pub use playground::Playground;

use crate::contract::Framework;
use crate::error::HarnessError;
use crate::harness::Scope;

/// Why a scenario failed.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Harness(#[from] HarnessError),
}

pub type ScenarioResult = Result<(), ScenarioError>;

/// Fail with an assertion error unless `actual == expected`.
pub fn expect_eq<T: PartialEq + fmt::Debug>(
    what: &str,
    actual: T,
    expected: T,
) -> ScenarioResult {
    if actual == expected {
        Ok(())
    } else {
        Err(ScenarioError::Assertion(format!(
            "{what}: expected {expected:?}, got {actual:?}"
        )))
    }
}

/// A script runnable against any adapter of type `F`.
pub trait Scenario<F: Framework> {
    fn name(&self) -> &str;

    fn run(&self, cx: &Scope<'_, F>) -> ScenarioResult;
}

/// A scenario backed by a closure. Built with [`scenario`].
pub struct FnScenario<F, Fun> {
    name: String,
    fun: Fun,
    _framework: PhantomData<fn(&F)>,
}

/// Wrap a closure as a named scenario.
///
/// ```rust,ignore
/// let hello = scenario("hello", |cx: &Scope<'_, Adapter>| {
///     cx.console().log("hi");
///     Ok(())
/// });
/// ```
pub fn scenario<F, Fun>(name: impl Into<String>, fun: Fun) -> FnScenario<F, Fun>
where
    F: Framework,
    Fun: Fn(&Scope<'_, F>) -> ScenarioResult,
{
    FnScenario {
        name: name.into(),
        fun,
        _framework: PhantomData,
    }
}

impl<F, Fun> Scenario<F> for FnScenario<F, Fun>
where
    F: Framework,
    Fun: Fn(&Scope<'_, F>) -> ScenarioResult,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, cx: &Scope<'_, F>) -> ScenarioResult {
        (self.fun)(cx)
    }
}

// ----------------------------------------------------------------------------
// Built-ins
// ----------------------------------------------------------------------------

/// Scenarios selectable by name from the CLI and config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    /// Counter, diamond, conditional dependencies and batching walkthrough.
    #[default]
    Basics,
    /// The short script the playground editor starts with.
    Playground,
    /// Checks the contract's guarantees, honouring capability gaps.
    Conformance,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Basics, Builtin::Playground, Builtin::Conformance];

    pub fn as_str(self) -> &'static str {
        match self {
            Builtin::Basics => "basics",
            Builtin::Playground => "playground",
            Builtin::Conformance => "conformance",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Builtin {
    type Err = HarnessError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Builtin::ALL
            .into_iter()
            .find(|builtin| builtin.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| HarnessError::UnknownScenario(name.to_string()))
    }
}

impl<F: Framework> Scenario<F> for Builtin {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn run(&self, cx: &Scope<'_, F>) -> ScenarioResult {
        match self {
            Builtin::Basics => Basics.run(cx),
            Builtin::Playground => Playground.run(cx),
            Builtin::Conformance => Conformance.run(cx),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
