//! The adapter descriptor every library implements.
//!
//! A [`Framework`] is a name plus the four reactive entry points and two
//! optional lifecycle hooks. Capabilities a library lacks are declared in
//! [`Capabilities`] instead of being papered over, so the runner can list
//! them next to each result.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use super::cell::{ComputeFn, Computed, Signal, Value};
use super::effect::{Disposer, EffectFn};
use crate::error::AdapterError;

/// Native grouping of writes.
///
/// Dependents observe all writes made inside `f` as one change.
pub trait Batch: Send + Sync {
    fn batch(&self, f: &mut dyn FnMut());
}

/// One reactive library behind the uniform contract.
#[allow(async_fn_in_trait)]
pub trait Framework: Send + Sync {
    /// Human-readable identifier, unique within a registry.
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    fn signal<T: Value>(&self, initial: T) -> Signal<T>;

    fn computed<T: Value>(&self, derive: ComputeFn<T>) -> Computed<T>;

    /// Register an effect. It runs once immediately.
    fn effect(&self, body: EffectFn) -> Disposer;

    /// `None` when the library cannot batch; callers then run the block inline.
    fn batch(&self) -> Option<&dyn Batch> {
        None
    }

    async fn setup(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn teardown(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Capabilities
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeekSupport {
    Untracked,
    /// `peek()` is a tracked read.
    TrackedFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectSupport {
    /// First run and every rerun happen inside the triggering call.
    Synchronous,
    /// First run is synchronous, reruns are scheduled on the executor.
    DeferredReruns,
    /// `effect()` returns a no-op disposer and never runs the body.
    Unsupported,
}

/// What a library can and cannot do natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub peek: PeekSupport,
    pub effects: EffectSupport,
    /// Primitives must be created under a root that setup opens.
    pub scoped: bool,
}

impl Capabilities {
    pub const fn full() -> Self {
        Self {
            peek: PeekSupport::Untracked,
            effects: EffectSupport::Synchronous,
            scoped: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

/// A degrade the harness applies on a library's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityGap {
    TrackedPeek,
    NoBatch,
    DeferredEffects,
    NoopEffects,
}

impl CapabilityGap {
    pub fn describe(self) -> &'static str {
        match self {
            CapabilityGap::TrackedPeek => "peek() falls back to a tracked read",
            CapabilityGap::NoBatch => "batch() runs the block inline",
            CapabilityGap::DeferredEffects => "effect reruns are deferred to the executor",
            CapabilityGap::NoopEffects => "effects never run",
        }
    }
}

impl fmt::Display for CapabilityGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

pub type Gaps = SmallVec<[CapabilityGap; 4]>;

/// Every degrade that applies to `framework`.
pub fn capability_gaps<F: Framework>(framework: &F) -> Gaps {
    let caps = framework.capabilities();
    let mut gaps = Gaps::new();
    if caps.peek == PeekSupport::TrackedFallback {
        gaps.push(CapabilityGap::TrackedPeek);
    }
    if framework.batch().is_none() {
        gaps.push(CapabilityGap::NoBatch);
    }
    match caps.effects {
        EffectSupport::Synchronous => {}
        EffectSupport::DeferredReruns => gaps.push(CapabilityGap::DeferredEffects),
        EffectSupport::Unsupported => gaps.push(CapabilityGap::NoopEffects),
    }
    gaps
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
