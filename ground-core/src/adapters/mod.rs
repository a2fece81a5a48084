//! Per-library adapters.
//!
//! Each adapter maps one family of signal primitives onto the [`Framework`]
//! contract. Three wrap `reactive_graph`; the fourth wraps the older
//! runtime-based `leptos_reactive`:
//!
//! | Adapter | Cells | Effects | Notes |
//! |---|---|---|---|
//! | [`ArcAdapter`] | `ArcRwSignal`, `ArcMemo` | `ImmediateEffect` | no batching |
//! | [`ArenaAdapter`] | `RwSignal`, `Memo` | `ImmediateEffect` | root owner per run |
//! | [`RenderEffectAdapter`] | `ArcRwSignal`, `ArcMemo` | `RenderEffect` | deferred reruns |
//! | [`RuntimeAdapter`] | `RwSignal`, `Memo` (0.6) | isomorphic effect | runtime per run, native batch |
//!
//! [`Adapter`] closes the set so a single [`Registry`] can hold all of them.

mod arc;
mod arena;
mod render;
mod runtime;

pub use arc::ArcAdapter;
pub use arena::ArenaAdapter;
pub use render::{ensure_executor, RenderEffectAdapter};
pub use runtime::RuntimeAdapter;

use crate::contract::{
    Batch, Capabilities, ComputeFn, Computed, Disposer, EffectFn, Framework, Signal, Value,
};
use crate::error::AdapterError;
use crate::harness::Registry;

/// Every adapter shipped with the harness.
#[derive(Debug)]
pub enum Adapter {
    Arc(ArcAdapter),
    Arena(ArenaAdapter),
    Render(RenderEffectAdapter),
    Runtime(RuntimeAdapter),
}

impl From<ArcAdapter> for Adapter {
    fn from(adapter: ArcAdapter) -> Self {
        Adapter::Arc(adapter)
    }
}

impl From<ArenaAdapter> for Adapter {
    fn from(adapter: ArenaAdapter) -> Self {
        Adapter::Arena(adapter)
    }
}

impl From<RenderEffectAdapter> for Adapter {
    fn from(adapter: RenderEffectAdapter) -> Self {
        Adapter::Render(adapter)
    }
}

impl From<RuntimeAdapter> for Adapter {
    fn from(adapter: RuntimeAdapter) -> Self {
        Adapter::Runtime(adapter)
    }
}

macro_rules! dispatch {
    ($self:ident, $adapter:ident => $body:expr) => {
        match $self {
            Adapter::Arc($adapter) => $body,
            Adapter::Arena($adapter) => $body,
            Adapter::Render($adapter) => $body,
            Adapter::Runtime($adapter) => $body,
        }
    };
}

impl Framework for Adapter {
    fn name(&self) -> &str {
        dispatch!(self, a => a.name())
    }

    fn capabilities(&self) -> Capabilities {
        dispatch!(self, a => a.capabilities())
    }

    fn signal<T: Value>(&self, initial: T) -> Signal<T> {
        dispatch!(self, a => a.signal(initial))
    }

    fn computed<T: Value>(&self, derive: ComputeFn<T>) -> Computed<T> {
        dispatch!(self, a => a.computed(derive))
    }

    fn effect(&self, body: EffectFn) -> Disposer {
        dispatch!(self, a => a.effect(body))
    }

    fn batch(&self) -> Option<&dyn Batch> {
        dispatch!(self, a => Framework::batch(a))
    }

    async fn setup(&self) -> Result<(), AdapterError> {
        dispatch!(self, a => a.setup().await)
    }

    async fn teardown(&self) -> Result<(), AdapterError> {
        dispatch!(self, a => a.teardown().await)
    }
}

/// The default registry: Arc, Arena, Render, then Runtime.
pub fn registry() -> Registry<Adapter> {
    let mut registry = Registry::new();
    for adapter in [
        Adapter::from(ArcAdapter::new()),
        Adapter::from(ArenaAdapter::new()),
        Adapter::from(RenderEffectAdapter::new()),
        Adapter::from(RuntimeAdapter::new()),
    ] {
        registry
            .register(adapter)
            .expect("built-in adapter names are distinct");
    }
    registry
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
