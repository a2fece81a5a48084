//! Arena-allocated `reactive_graph` primitives.
//!
//! `RwSignal` and `Memo` are `Copy` handles into a global arena. Each node
//! belongs to the `Owner` that was current when it was created and is freed
//! when that owner is cleaned up. This is the "root scope" style of library:
//!
//! - `setup()` opens one root owner for the whole scenario
//! - every primitive and effect is created under that root
//! - `teardown()` cleans the root, which frees every node and stops every
//!   effect created during the run
//!
//! A primitive requested before `setup()` lazily opens the root, so a
//! misbehaving caller still gets a working cell.

use parking_lot::Mutex;
use reactive_graph::computed::Memo;
use reactive_graph::owner::Owner;
use reactive_graph::signal::RwSignal;
use reactive_graph::traits::{Get, GetUntracked, Set};
use tracing::debug;

use super::arc::immediate_effect;
use crate::contract::{
    Capabilities, ComputeFn, Computed, ComputedCell, Disposer, EffectFn, EffectSupport,
    Framework, PeekSupport, Signal, SignalCell, Value,
};
use crate::error::AdapterError;

/// Adapter over `RwSignal` / `Memo` living under a root `Owner`.
#[derive(Default)]
pub struct ArenaAdapter {
    root: Mutex<Option<Owner>>,
}

impl ArenaAdapter {
    pub const NAME: &'static str = "Leptos Arena Signals";

    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a root owner is currently open.
    pub fn has_root(&self) -> bool {
        self.root.lock().is_some()
    }

    /// Run `f` with the root owner current, opening the root if needed.
    fn within_root<R>(&self, f: impl FnOnce() -> R) -> R {
        let root = self.root.lock().get_or_insert_with(Owner::new).clone();
        root.with(f)
    }
}

impl std::fmt::Debug for ArenaAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaAdapter")
            .field("has_root", &self.has_root())
            .finish()
    }
}

impl Framework for ArenaAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            peek: PeekSupport::Untracked,
            effects: EffectSupport::Synchronous,
            scoped: true,
        }
    }

    fn signal<T: Value>(&self, initial: T) -> Signal<T> {
        let signal = self.within_root(|| RwSignal::new(initial));
        Signal::new(ArenaSignalCell(signal))
    }

    fn computed<T: Value>(&self, derive: ComputeFn<T>) -> Computed<T> {
        let memo = self.within_root(|| Memo::new(move |_| derive()));
        Computed::new(ArenaMemoCell(memo))
    }

    fn effect(&self, body: EffectFn) -> Disposer {
        self.within_root(|| immediate_effect(body))
    }

    async fn setup(&self) -> Result<(), AdapterError> {
        let mut root = self.root.lock();
        if root.is_none() {
            *root = Some(Owner::new());
        }
        debug!(adapter = Self::NAME, "root owner opened");
        Ok(())
    }

    async fn teardown(&self) -> Result<(), AdapterError> {
        let root = self.root.lock().take();
        match root {
            Some(root) => {
                root.cleanup();
                debug!(adapter = Self::NAME, "root owner cleaned up");
                Ok(())
            }
            None => Err(AdapterError::Teardown(
                "no root owner is open".to_string(),
            )),
        }
    }
}

// ----------------------------------------------------------------------------
// Cells
// ----------------------------------------------------------------------------

struct ArenaSignalCell<T: Send + Sync + 'static>(RwSignal<T>);

impl<T: Value> SignalCell<T> for ArenaSignalCell<T> {
    fn get(&self) -> T {
        self.0.get()
    }

    fn set(&self, value: T) {
        self.0.set(value);
    }

    fn peek(&self) -> T {
        self.0.get_untracked()
    }
}

struct ArenaMemoCell<T: Send + Sync + 'static>(Memo<T>);

impl<T: Value> ComputedCell<T> for ArenaMemoCell<T> {
    fn get(&self) -> T {
        self.0.get()
    }

    fn peek(&self) -> T {
        self.0.get_untracked()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
