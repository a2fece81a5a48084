//! Reference-counted `reactive_graph` primitives.
//!
//! `ArcRwSignal` and `ArcMemo` own their state directly and need no
//! enclosing owner. Effects are `ImmediateEffect`s: the first run happens
//! inside `effect()` and every rerun happens inside the `set()` that caused
//! it. No batch is exposed, so `batch()` degrades to inline execution.
//!
//! Effects that read a memo need `reactive_graph` 0.2 or later. Before that
//! release a memo notified its subscribers while holding its own lock, and an
//! `ImmediateEffect` that recomputed the memo from inside the notification
//! deadlocked on the first `set()`.

use std::sync::Arc;

use reactive_graph::computed::ArcMemo;
use reactive_graph::effect::ImmediateEffect;
use reactive_graph::signal::ArcRwSignal;
use reactive_graph::traits::{Get, GetUntracked, Set};
use tracing::trace;

use crate::contract::{
    Capabilities, ComputeFn, Computed, ComputedCell, Disposer, EffectBody, EffectFn, Framework,
    Signal, SignalCell, Value,
};

/// Adapter over `ArcRwSignal` / `ArcMemo` / `ImmediateEffect`.
#[derive(Debug, Default)]
pub struct ArcAdapter;

impl ArcAdapter {
    pub const NAME: &'static str = "Leptos Arc Signals";

    pub fn new() -> Self {
        Self
    }
}

impl Framework for ArcAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    fn signal<T: Value>(&self, initial: T) -> Signal<T> {
        Signal::new(ArcSignalCell(ArcRwSignal::new(initial)))
    }

    fn computed<T: Value>(&self, derive: ComputeFn<T>) -> Computed<T> {
        Computed::new(ArcMemoCell(ArcMemo::new(move |_| derive())))
    }

    fn effect(&self, body: EffectFn) -> Disposer {
        immediate_effect(body)
    }
}

/// Drive an [`EffectBody`] from an `ImmediateEffect`.
///
/// Dropping the `ImmediateEffect` unsubscribes it; the body is disposed first
/// so a notification already in flight finds it stopped.
pub(crate) fn immediate_effect(body: EffectFn) -> Disposer {
    let body = Arc::new(EffectBody::new(body));
    let effect = ImmediateEffect::new_isomorphic({
        let body = Arc::clone(&body);
        move || {
            body.run();
        }
    });
    trace!(runs = body.run_count(), "immediate effect created");

    Disposer::new(move || {
        body.dispose();
        drop(effect);
    })
}

// ----------------------------------------------------------------------------
// Cells
// ----------------------------------------------------------------------------

pub(crate) struct ArcSignalCell<T>(pub(crate) ArcRwSignal<T>);

impl<T: Value> SignalCell<T> for ArcSignalCell<T> {
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

pub(crate) struct ArcMemoCell<T: Send + Sync + 'static>(pub(crate) ArcMemo<T>);

impl<T: Value> ComputedCell<T> for ArcMemoCell<T> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Cleanup;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn signal_reads_and_writes() {
        let adapter = ArcAdapter::new();
        let count = adapter.signal(1);
        assert_eq!(count.get(), 1);

        count.set(4);
        assert_eq!(count.get(), 4);
        assert_eq!(count.peek(), 4);
    }

    #[test]
    fn memo_is_lazy_and_cached() {
        let adapter = ArcAdapter::new();
        let computes = Arc::new(AtomicI32::new(0));
        let count = adapter.signal(2);

        let doubled = {
            let count = count.clone();
            let computes = computes.clone();
            adapter.computed(Arc::new(move || {
                computes.fetch_add(1, Ordering::SeqCst);
                count.get() * 2
            }))
        };
        assert_eq!(computes.load(Ordering::SeqCst), 0);

        assert_eq!(doubled.get(), 4);
        assert_eq!(doubled.get(), 4);
        assert_eq!(computes.load(Ordering::SeqCst), 1);

        count.set(5);
        assert_eq!(doubled.get(), 10);
        assert_eq!(computes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn effect_reruns_synchronously_until_disposed() {
        let adapter = ArcAdapter::new();
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
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        count.set(3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        disposer.dispose();
        count.set(9);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn effect_over_memo_follows_source() {
        let adapter = ArcAdapter::new();
        let seen = Arc::new(AtomicI32::new(-1));
        let runs = Arc::new(AtomicI32::new(0));
        let count = adapter.signal(1);
        let doubled = {
            let count = count.clone();
            adapter.computed(Arc::new(move || count.get() * 2))
        };

        let disposer = {
            let (doubled, seen, runs) = (doubled.clone(), seen.clone(), runs.clone());
            adapter.effect(Arc::new(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                seen.store(doubled.get(), Ordering::SeqCst);
                Cleanup::None
            }))
        };
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        count.set(5);
        assert_eq!(seen.load(Ordering::SeqCst), 10);
        count.set(6);
        assert_eq!(seen.load(Ordering::SeqCst), 12);
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        disposer.dispose();
        count.set(7);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
