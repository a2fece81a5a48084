//! The active-implementation slot and the scope scenarios run in.
//!
//! Exactly one adapter is "active" at a time while the runner walks the
//! registry. The slot is an explicit value owned by the runner, not process
//! state, so two runners never see each other's adapter.
//!
//! # How Dispatch Works
//!
//! 1. The runner calls [`ActiveSlot::install`] with the adapter under test.
//! 2. [`ActiveSlot::bind`] hands out a [`Scope`] borrowing that adapter.
//! 3. The scenario creates signals, computeds and effects through the scope.
//! 4. Dropping the scope disposes every effect it created.
//! 5. The runner calls [`ActiveSlot::clear`] before moving on.
//!
//! Requests made while the slot is empty fail with
//! [`HarnessError::NoImplementation`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::capture::Console;
use crate::contract::{Cleanup, Computed, Disposer, Framework, Signal, Value};
use crate::error::{HarnessError, Result};

/// Holds the adapter the entry points currently dispatch to.
pub struct ActiveSlot<'a, F> {
    current: Option<&'a F>,
}

impl<'a, F: Framework> ActiveSlot<'a, F> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Install `adapter`, replacing whatever was installed before.
    pub fn install(&mut self, adapter: &'a F) -> Option<&'a F> {
        trace!(adapter = adapter.name(), "installing adapter");
        self.current.replace(adapter)
    }

    pub fn clear(&mut self) -> Option<&'a F> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&'a F> {
        self.current
    }

    pub fn is_installed(&self) -> bool {
        self.current.is_some()
    }

    fn require(&self, entry_point: &'static str) -> Result<&'a F> {
        self.current
            .ok_or(HarnessError::NoImplementation(entry_point))
    }

    pub fn signal<T: Value>(&self, initial: T) -> Result<Signal<T>> {
        Ok(self.require("signal")?.signal(initial))
    }

    pub fn computed<T: Value>(
        &self,
        derive: impl Fn() -> T + Send + Sync + 'static,
    ) -> Result<Computed<T>> {
        Ok(self.require("computed")?.computed(Arc::new(derive)))
    }

    pub fn effect<R: Into<Cleanup> + 'static>(
        &self,
        body: impl Fn() -> R + Send + Sync + 'static,
    ) -> Result<Disposer> {
        let adapter = self.require("effect")?;
        Ok(adapter.effect(Arc::new(move || body().into())))
    }

    /// Run `f` as one batch, or inline when the adapter cannot batch.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        Ok(batch_with(self.require("batch")?, f))
    }

    /// A scope bound to the installed adapter.
    pub fn bind(&self) -> Result<Scope<'a, F>> {
        Ok(Scope::new(self.require("scope")?))
    }
}

impl<F: Framework> Default for ActiveSlot<'_, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Framework> fmt::Debug for ActiveSlot<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSlot")
            .field("current", &self.current.map(|adapter| adapter.name()))
            .finish()
    }
}

fn batch_with<F: Framework, R>(adapter: &F, f: impl FnOnce() -> R) -> R {
    match adapter.batch() {
        Some(native) => {
            let mut f = Some(f);
            let mut result = None;
            native.batch(&mut || {
                if let Some(f) = f.take() {
                    result = Some(f());
                }
            });
            match (result, f) {
                (Some(result), _) => result,
                // The library skipped the block; run it ourselves.
                (None, Some(f)) => f(),
                (None, None) => unreachable!("batch block consumed without a result"),
            }
        }
        None => f(),
    }
}

// ----------------------------------------------------------------------------
// Scope
// ----------------------------------------------------------------------------

/// The four entry points, bound to one adapter for one scenario run.
///
/// Effects created through a scope are disposed when the scope is dropped.
pub struct Scope<'a, F> {
    adapter: &'a F,
    console: Console,
    effects: Mutex<Vec<Disposer>>,
}

impl<'a, F: Framework> Scope<'a, F> {
    pub fn new(adapter: &'a F) -> Self {
        Self {
            adapter,
            console: Console,
            effects: Mutex::new(Vec::new()),
        }
    }

    pub fn adapter(&self) -> &'a F {
        self.adapter
    }

    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    pub fn console(&self) -> Console {
        self.console
    }

    pub fn signal<T: Value>(&self, initial: T) -> Signal<T> {
        self.adapter.signal(initial)
    }

    pub fn computed<T: Value>(
        &self,
        derive: impl Fn() -> T + Send + Sync + 'static,
    ) -> Computed<T> {
        self.adapter.computed(Arc::new(derive))
    }

    /// Register an effect. The body may return `()` or a [`Cleanup`].
    pub fn effect<R: Into<Cleanup> + 'static>(
        &self,
        body: impl Fn() -> R + Send + Sync + 'static,
    ) -> Disposer {
        let disposer = self.adapter.effect(Arc::new(move || body().into()));
        self.effects.lock().push(disposer.clone());
        disposer
    }

    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        batch_with(self.adapter, f)
    }

    /// Number of effects created through this scope.
    pub fn effect_count(&self) -> usize {
        self.effects.lock().len()
    }

    /// Dispose every effect created so far.
    pub fn dispose_effects(&self) {
        let effects = std::mem::take(&mut *self.effects.lock());
        for disposer in effects {
            disposer.dispose();
        }
    }
}

impl<F> Drop for Scope<'_, F> {
    fn drop(&mut self) {
        for disposer in self.effects.get_mut().drain(..) {
            disposer.dispose();
        }
    }
}

impl<F: Framework> fmt::Debug for Scope<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("adapter", &self.adapter.name())
            .field("effects", &self.effect_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
