//! Configurable test double for [`Framework`].
//!
//! `FakeFramework` borrows working cells from the Arc adapter and lets a
//! test switch individual capabilities off or make lifecycle hooks fail.
//! It is used by unit tests here and by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::adapters::ArcAdapter;
use crate::contract::{
    Batch, Capabilities, ComputeFn, Computed, Disposer, EffectFn, EffectSupport, Framework,
    PeekSupport, Signal, SignalCell, Value,
};
use crate::error::AdapterError;

#[derive(Debug, Clone, Default)]
struct Behavior {
    setup_error: Option<String>,
    setup_panics: bool,
    teardown_error: Option<String>,
    teardown_panics: bool,
    tracked_peek: bool,
    noop_effects: bool,
    native_batch: bool,
}

#[derive(Debug, Default)]
pub struct FakeFramework {
    name: String,
    behavior: Behavior,
    cells: ArcAdapter,
    setups: AtomicUsize,
    teardowns: AtomicUsize,
    batches: AtomicUsize,
}

impl FakeFramework {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn failing_setup(mut self, message: impl Into<String>) -> Self {
        self.behavior.setup_error = Some(message.into());
        self
    }

    pub fn panicking_setup(mut self) -> Self {
        self.behavior.setup_panics = true;
        self
    }

    pub fn failing_teardown(mut self, message: impl Into<String>) -> Self {
        self.behavior.teardown_error = Some(message.into());
        self
    }

    pub fn panicking_teardown(mut self) -> Self {
        self.behavior.teardown_panics = true;
        self
    }

    /// `peek()` becomes a tracked read.
    pub fn tracked_peek(mut self) -> Self {
        self.behavior.tracked_peek = true;
        self
    }

    /// `effect()` returns a no-op disposer.
    pub fn noop_effects(mut self) -> Self {
        self.behavior.noop_effects = true;
        self
    }

    /// Expose a native `batch` that counts its invocations.
    pub fn with_batch(mut self) -> Self {
        self.behavior.native_batch = true;
        self
    }

    pub fn setup_calls(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }

    pub fn teardown_calls(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

impl Batch for FakeFramework {
    fn batch(&self, f: &mut dyn FnMut()) {
        self.batches.fetch_add(1, Ordering::SeqCst);
        f();
    }
}

impl Framework for FakeFramework {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            peek: if self.behavior.tracked_peek {
                PeekSupport::TrackedFallback
            } else {
                PeekSupport::Untracked
            },
            effects: if self.behavior.noop_effects {
                EffectSupport::Unsupported
            } else {
                EffectSupport::Synchronous
            },
            scoped: false,
        }
    }

    fn signal<T: Value>(&self, initial: T) -> Signal<T> {
        let signal = self.cells.signal(initial);
        if self.behavior.tracked_peek {
            Signal::new(TrackedPeek(signal))
        } else {
            signal
        }
    }

    fn computed<T: Value>(&self, derive: ComputeFn<T>) -> Computed<T> {
        self.cells.computed(derive)
    }

    fn effect(&self, body: EffectFn) -> Disposer {
        if self.behavior.noop_effects {
            return Disposer::noop();
        }
        self.cells.effect(body)
    }

    fn batch(&self) -> Option<&dyn Batch> {
        self.behavior.native_batch.then_some(self as &dyn Batch)
    }

    async fn setup(&self) -> Result<(), AdapterError> {
        self.setups.fetch_add(1, Ordering::SeqCst);
        if self.behavior.setup_panics {
            panic!("{} exploded during setup", self.name);
        }
        match &self.behavior.setup_error {
            Some(message) => Err(AdapterError::Setup(message.clone())),
            None => Ok(()),
        }
    }

    async fn teardown(&self) -> Result<(), AdapterError> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        if self.behavior.teardown_panics {
            panic!("{} exploded during teardown", self.name);
        }
        match &self.behavior.teardown_error {
            Some(message) => Err(AdapterError::Teardown(message.clone())),
            None => Ok(()),
        }
    }
}

struct TrackedPeek<T>(Signal<T>);

impl<T: Value> SignalCell<T> for TrackedPeek<T> {
    fn get(&self) -> T {
        self.0.get()
    }

    fn set(&self, value: T) {
        self.0.set(value);
    }

    fn peek(&self) -> T {
        self.0.get()
    }
}
