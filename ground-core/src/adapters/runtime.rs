//! `leptos_reactive` 0.6, the runtime-scoped signal library.
//!
//! Every node lives in a `Runtime` that `setup()` creates and `teardown()`
//! disposes. Signal and memo handles are `Copy` ids into that runtime, so a
//! handle outlives nothing: once the runtime is gone every read fails.
//!
//! How a run works:
//!
//! - `setup()` creates a runtime and makes it current on this thread
//! - every cell remembers its runtime and makes it current before each access
//! - effects are isomorphic effects: the first run happens inside `effect()`
//!   and reruns happen inside the `set()` that caused them
//! - `batch()` is the library's own batch, so effects rerun once after the
//!   block instead of once per write
//! - `teardown()` disposes the runtime and every node created in it
//!
//! Runtimes are thread-local. The adapter has to be driven from the thread
//! that called `setup()`.

use std::sync::Arc;

use leptos_reactive::{
    create_isomorphic_effect, create_memo, create_runtime, create_rw_signal, set_current_runtime,
    try_batch, Memo, RuntimeId, RwSignal, SignalDispose, SignalGet, SignalGetUntracked,
    SignalSet,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::contract::{
    Batch, Capabilities, ComputeFn, Computed, ComputedCell, Disposer, EffectBody, EffectFn,
    EffectSupport, Framework, PeekSupport, Signal, SignalCell, Value,
};
use crate::error::AdapterError;

/// Adapter over `leptos_reactive` signals, memos and isomorphic effects.
#[derive(Debug, Default)]
pub struct RuntimeAdapter {
    runtime: Mutex<Option<RuntimeId>>,
}

impl RuntimeAdapter {
    pub const NAME: &'static str = "Leptos Reactive Runtime";

    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a runtime is currently open.
    pub fn has_runtime(&self) -> bool {
        self.runtime.lock().is_some()
    }

    /// The open runtime, created on first use and made current.
    fn enter(&self) -> RuntimeId {
        let runtime = *self.runtime.lock().get_or_insert_with(create_runtime);
        set_current_runtime(runtime);
        runtime
    }
}

impl Batch for RuntimeAdapter {
    fn batch(&self, f: &mut dyn FnMut()) {
        self.enter();
        if let Err(err) = try_batch(|| f()) {
            // Without a runtime the block never ran.
            warn!(adapter = Self::NAME, ?err, "batch ran without a runtime");
            f();
        }
    }
}

impl Framework for RuntimeAdapter {
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
        let runtime = self.enter();
        Signal::new(RuntimeSignalCell {
            runtime,
            signal: create_rw_signal(initial),
        })
    }

    fn computed<T: Value>(&self, derive: ComputeFn<T>) -> Computed<T> {
        let runtime = self.enter();
        Computed::new(RuntimeMemoCell {
            runtime,
            memo: create_memo(move |_| derive()),
        })
    }

    fn effect(&self, body: EffectFn) -> Disposer {
        let runtime = self.enter();
        let body = Arc::new(EffectBody::new(body));
        let effect = create_isomorphic_effect({
            let body = Arc::clone(&body);
            move |_: Option<()>| {
                body.run();
            }
        });

        Disposer::new(move || {
            body.dispose();
            set_current_runtime(runtime);
            effect.dispose();
        })
    }

    fn batch(&self) -> Option<&dyn Batch> {
        Some(self)
    }

    async fn setup(&self) -> Result<(), AdapterError> {
        let runtime = self.enter();
        debug!(adapter = Self::NAME, ?runtime, "runtime created");
        Ok(())
    }

    async fn teardown(&self) -> Result<(), AdapterError> {
        let runtime = self.runtime.lock().take();
        match runtime {
            Some(runtime) => {
                runtime.dispose();
                debug!(adapter = Self::NAME, "runtime disposed");
                Ok(())
            }
            None => Err(AdapterError::Teardown("no runtime is open".to_string())),
        }
    }
}

// ----------------------------------------------------------------------------
// Cells
// ----------------------------------------------------------------------------

struct RuntimeSignalCell<T: 'static> {
    runtime: RuntimeId,
    signal: RwSignal<T>,
}

impl<T: Value> SignalCell<T> for RuntimeSignalCell<T> {
    fn get(&self) -> T {
        set_current_runtime(self.runtime);
        self.signal.get()
    }

    fn set(&self, value: T) {
        set_current_runtime(self.runtime);
        self.signal.set(value);
    }

    fn peek(&self) -> T {
        set_current_runtime(self.runtime);
        self.signal.get_untracked()
    }
}

struct RuntimeMemoCell<T: 'static> {
    runtime: RuntimeId,
    memo: Memo<T>,
}

impl<T: Value> ComputedCell<T> for RuntimeMemoCell<T> {
    fn get(&self) -> T {
        set_current_runtime(self.runtime);
        self.memo.get()
    }

    fn peek(&self) -> T {
        set_current_runtime(self.runtime);
        self.memo.get_untracked()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
