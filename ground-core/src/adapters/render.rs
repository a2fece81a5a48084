//! `reactive_graph` render effects.
//!
//! Cells are the same `ArcRwSignal` / `ArcMemo` pair as the Arc adapter. The
//! difference is the effect primitive: a `RenderEffect` runs its first pass
//! synchronously, but each rerun is a message to a task spawned on the
//! async executor. A `set()` therefore returns before dependent effects have
//! rerun, and a scenario that logs from effects sees those lines late or not
//! at all. This is the adapter that exercises deferred effect scheduling.
//!
//! The executor is `any_spawner` backed by tokio. It is process-global and
//! can only be installed once; `setup()` installs it and accepts an
//! executor that is already in place.

use std::sync::Arc;

use any_spawner::{Executor, ExecutorError};
use reactive_graph::computed::ArcMemo;
use reactive_graph::effect::RenderEffect;
use reactive_graph::signal::ArcRwSignal;
use tracing::debug;

use super::arc::{ArcMemoCell, ArcSignalCell};
use crate::contract::{
    Capabilities, ComputeFn, Computed, Disposer, EffectBody, EffectFn, EffectSupport, Framework,
    PeekSupport, Signal, Value,
};
use crate::error::AdapterError;

/// Adapter over `ArcRwSignal` / `ArcMemo` / `RenderEffect`.
#[derive(Debug, Default)]
pub struct RenderEffectAdapter;

impl RenderEffectAdapter {
    pub const NAME: &'static str = "Leptos Render Effects";

    pub fn new() -> Self {
        Self
    }
}

/// Install the tokio-backed executor once per process.
pub fn ensure_executor() {
    match Executor::init_tokio() {
        Ok(()) => debug!("tokio executor installed"),
        Err(ExecutorError::AlreadySet) => {}
    }
}

impl Framework for RenderEffectAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            peek: PeekSupport::Untracked,
            effects: EffectSupport::DeferredReruns,
            scoped: false,
        }
    }

    fn signal<T: Value>(&self, initial: T) -> Signal<T> {
        Signal::new(ArcSignalCell(ArcRwSignal::new(initial)))
    }

    fn computed<T: Value>(&self, derive: ComputeFn<T>) -> Computed<T> {
        Computed::new(ArcMemoCell(ArcMemo::new(move |_| derive())))
    }

    /// Must be called inside a tokio runtime: the rerun loop is spawned here.
    fn effect(&self, body: EffectFn) -> Disposer {
        ensure_executor();

        let body = Arc::new(EffectBody::new(body));
        let effect = RenderEffect::new_isomorphic({
            let body = Arc::clone(&body);
            move |_: Option<()>| {
                body.run();
            }
        });

        Disposer::new(move || {
            body.dispose();
            drop(effect);
        })
    }

    async fn setup(&self) -> Result<(), AdapterError> {
        ensure_executor();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Cleanup;
    use std::sync::atomic::{AtomicI32, Ordering};

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn first_run_is_synchronous() {
        let adapter = RenderEffectAdapter::new();
        adapter.setup().await.unwrap();

        let runs = Arc::new(AtomicI32::new(0));
        let _disposer = {
            let runs = runs.clone();
            adapter.effect(Arc::new(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                Cleanup::None
            }))
        };
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reruns_arrive_after_yielding() {
        let adapter = RenderEffectAdapter::new();
        adapter.setup().await.unwrap();

        let seen = Arc::new(AtomicI32::new(-1));
        let count = adapter.signal(0);
        let _disposer = {
            let count = count.clone();
            let seen = seen.clone();
            adapter.effect(Arc::new(move || {
                seen.store(count.get(), Ordering::SeqCst);
                Cleanup::None
            }))
        };

        count.set(8);
        settle().await;
        assert_eq!(seen.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn disposed_effect_ignores_queued_rerun() {
        let adapter = RenderEffectAdapter::new();
        adapter.setup().await.unwrap();

        let seen = Arc::new(AtomicI32::new(-1));
        let count = adapter.signal(0);
        let disposer = {
            let count = count.clone();
            let seen = seen.clone();
            adapter.effect(Arc::new(move || {
                seen.store(count.get(), Ordering::SeqCst);
                Cleanup::None
            }))
        };

        count.set(5);
        disposer.dispose();
        settle().await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn setup_is_repeatable() {
        let adapter = RenderEffectAdapter::new();
        adapter.setup().await.unwrap();
        adapter.setup().await.unwrap();
    }
}
