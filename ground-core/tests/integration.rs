//! Integration Tests for the Adapters
//!
//! Every test here runs against each adapter in the default registry, so a
//! library that breaks one of the contract's guarantees fails by name.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use ground_core::adapters::{self, Adapter};
use ground_core::contract::{
    capability_gaps, CapabilityGap, Cleanup, EffectSupport, Framework, PeekSupport,
};
use ground_core::harness::Scope;

/// Give deferred effect reruns a chance to happen.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

async fn setup(adapter: &Adapter) {
    adapter
        .setup()
        .await
        .unwrap_or_else(|err| panic!("{}: {err}", adapter.name()));
}

async fn teardown(adapter: &Adapter) {
    adapter
        .teardown()
        .await
        .unwrap_or_else(|err| panic!("{}: {err}", adapter.name()));
}

/// A freshly created signal returns its initial value.
#[tokio::test]
async fn fresh_signal_returns_initial_value() {
    for adapter in &adapters::registry() {
        setup(adapter).await;

        assert_eq!(adapter.signal(7).get(), 7, "{}", adapter.name());
        assert_eq!(
            adapter.signal(String::from("seven")).get(),
            "seven",
            "{}",
            adapter.name()
        );
        assert_eq!(
            adapter.signal(vec![Some(1), None]).get(),
            vec![Some(1), None],
            "{}",
            adapter.name()
        );

        teardown(adapter).await;
    }
}

/// Only the last write is observable through `get()`.
#[tokio::test]
async fn last_write_wins() {
    for adapter in &adapters::registry() {
        setup(adapter).await;

        let s = adapter.signal(0);
        s.set(1);
        s.set(2);
        s.set(3);
        assert_eq!(s.get(), 3, "{}", adapter.name());
        assert_eq!(s.peek(), 3, "{}", adapter.name());

        teardown(adapter).await;
    }
}

/// A computed that peeks a signal does not recompute when it changes.
#[tokio::test]
async fn peek_does_not_create_dependency() {
    for adapter in &adapters::registry() {
        setup(adapter).await;
        assert_eq!(adapter.capabilities().peek, PeekSupport::Untracked);

        let tracked = adapter.signal(1);
        let peeked = adapter.signal(100);
        let computes = Arc::new(AtomicI32::new(0));
        let sum = {
            let (tracked, peeked, computes) = (tracked.clone(), peeked.clone(), computes.clone());
            adapter.computed(Arc::new(move || {
                computes.fetch_add(1, Ordering::SeqCst);
                tracked.get() + peeked.peek()
            }))
        };

        assert_eq!(sum.get(), 101);
        peeked.set(200);
        assert_eq!(sum.get(), 101, "{}", adapter.name());
        assert_eq!(computes.load(Ordering::SeqCst), 1, "{}", adapter.name());

        tracked.set(2);
        assert_eq!(sum.get(), 202, "{}", adapter.name());
        assert_eq!(computes.load(Ordering::SeqCst), 2, "{}", adapter.name());

        teardown(adapter).await;
    }
}

/// Two branches joined again: 4, then 7 after the source changes.
#[tokio::test]
async fn diamond_dependency() {
    for adapter in &adapters::registry() {
        setup(adapter).await;

        let source = adapter.signal(1);
        let left = {
            let source = source.clone();
            adapter.computed(Arc::new(move || source.get() * 2))
        };
        let right = {
            let source = source.clone();
            adapter.computed(Arc::new(move || source.get() + 1))
        };
        let result = adapter.computed(Arc::new(move || left.get() + right.get()));

        assert_eq!(result.get(), 4, "{}", adapter.name());
        source.set(2);
        assert_eq!(result.get(), 7, "{}", adapter.name());

        teardown(adapter).await;
    }
}

/// Recompute counts follow whichever branch is active.
#[tokio::test]
async fn conditional_dependencies() {
    for adapter in &adapters::registry() {
        setup(adapter).await;

        let use_x = adapter.signal(true);
        let x = adapter.signal(10);
        let y = adapter.signal(20);
        let runs = Arc::new(AtomicI32::new(0));
        let conditional = {
            let (use_x, x, y, runs) = (use_x.clone(), x.clone(), y.clone(), runs.clone());
            adapter.computed(Arc::new(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                if use_x.get() {
                    x.get()
                } else {
                    y.get()
                }
            }))
        };
        let observe = || (conditional.get(), runs.load(Ordering::SeqCst));

        assert_eq!(observe(), (10, 1), "{}", adapter.name());
        y.set(25);
        assert_eq!(observe(), (10, 1), "{}", adapter.name());
        x.set(15);
        assert_eq!(observe(), (15, 2), "{}", adapter.name());
        use_x.set(false);
        assert_eq!(observe(), (25, 3), "{}", adapter.name());
        y.set(30);
        assert_eq!(observe(), (30, 4), "{}", adapter.name());
        x.set(100);
        assert_eq!(observe(), (30, 4), "{}", adapter.name());

        teardown(adapter).await;
    }
}

/// Effects see writes, immediately or after yielding depending on the adapter.
#[tokio::test]
async fn effects_follow_writes() {
    for adapter in &adapters::registry() {
        setup(adapter).await;

        let s = adapter.signal(0);
        let seen = Arc::new(AtomicI32::new(-1));
        let disposer = {
            let (s, seen) = (s.clone(), seen.clone());
            adapter.effect(Arc::new(move || {
                seen.store(s.get(), Ordering::SeqCst);
                Cleanup::None
            }))
        };
        assert_eq!(seen.load(Ordering::SeqCst), 0, "{}", adapter.name());

        s.set(5);
        if adapter.capabilities().effects == EffectSupport::DeferredReruns {
            settle().await;
        }
        assert_eq!(seen.load(Ordering::SeqCst), 5, "{}", adapter.name());

        disposer.dispose();
        teardown(adapter).await;
    }
}

/// Disposing twice is fine and nothing reruns afterwards.
#[tokio::test]
async fn disposal_is_idempotent_and_final() {
    for adapter in &adapters::registry() {
        setup(adapter).await;

        let s = adapter.signal(0);
        let runs = Arc::new(AtomicI32::new(0));
        let cleanups = Arc::new(AtomicI32::new(0));
        let disposer = {
            let (s, runs, cleanups) = (s.clone(), runs.clone(), cleanups.clone());
            adapter.effect(Arc::new(move || {
                s.get();
                runs.fetch_add(1, Ordering::SeqCst);
                let cleanups = cleanups.clone();
                Cleanup::callback(move || {
                    cleanups.fetch_add(1, Ordering::SeqCst);
                })
            }))
        };

        disposer.dispose();
        disposer.dispose();
        assert!(disposer.is_disposed());
        assert_eq!(cleanups.load(Ordering::SeqCst), 1, "{}", adapter.name());

        let before = runs.load(Ordering::SeqCst);
        s.set(1);
        s.set(2);
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), before, "{}", adapter.name());

        teardown(adapter).await;
    }
}

/// An effect that reads a computed reruns when the computed's source changes.
#[tokio::test]
async fn effect_reading_computed_follows_source() {
    for adapter in &adapters::registry() {
        setup(adapter).await;

        let count = adapter.signal(1);
        let doubled = {
            let count = count.clone();
            adapter.computed(Arc::new(move || count.get() * 2))
        };
        let seen = Arc::new(AtomicI32::new(-1));
        let disposer = {
            let (doubled, seen) = (doubled.clone(), seen.clone());
            adapter.effect(Arc::new(move || {
                seen.store(doubled.get(), Ordering::SeqCst);
                Cleanup::None
            }))
        };
        assert_eq!(seen.load(Ordering::SeqCst), 2, "{}", adapter.name());

        count.set(2);
        if adapter.capabilities().effects == EffectSupport::DeferredReruns {
            settle().await;
        }
        assert_eq!(seen.load(Ordering::SeqCst), 4, "{}", adapter.name());
        assert_eq!(doubled.get(), 4, "{}", adapter.name());

        disposer.dispose();
        teardown(adapter).await;
    }
}

/// Writes inside `batch` all land, natively batched or run inline.
#[tokio::test]
async fn batch_writes_all_land() {
    for adapter in &adapters::registry() {
        setup(adapter).await;
        assert_eq!(
            adapter.batch().is_none(),
            capability_gaps(adapter).contains(&CapabilityGap::NoBatch),
            "{}",
            adapter.name()
        );

        {
            let cx = Scope::new(adapter);
            let a = cx.signal(1);
            let b = cx.signal(2);
            let sum = {
                let (a, b) = (a.clone(), b.clone());
                cx.computed(move || a.get() + b.get())
            };
            let returned = cx.batch(|| {
                a.set(20);
                b.set(30);
                "done"
            });
            assert_eq!(returned, "done");
            assert_eq!(sum.get(), 50, "{}", adapter.name());
        }

        teardown(adapter).await;
    }
}

/// An effect over `sum = a + b` reruns twice for two writes, and at most
/// once when the adapter batches them natively.
#[tokio::test]
async fn batch_coalesces_effect_reruns() {
    for adapter in &adapters::registry() {
        setup(adapter).await;
        let synchronous = adapter.capabilities().effects == EffectSupport::Synchronous;

        {
            let cx = Scope::new(adapter);
            let a = cx.signal(1);
            let b = cx.signal(2);
            let sum = {
                let (a, b) = (a.clone(), b.clone());
                cx.computed(move || a.get() + b.get())
            };
            let runs = Arc::new(AtomicI32::new(0));
            let seen = Arc::new(AtomicI32::new(0));
            let _effect = {
                let (runs, seen) = (runs.clone(), seen.clone());
                cx.effect(move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    seen.store(sum.get(), Ordering::SeqCst);
                })
            };
            assert_eq!(runs.load(Ordering::SeqCst), 1, "{}", adapter.name());

            a.set(10);
            b.set(20);
            if synchronous {
                assert_eq!(runs.load(Ordering::SeqCst), 3, "{}", adapter.name());
                assert_eq!(seen.load(Ordering::SeqCst), 30, "{}", adapter.name());
            }

            let before = runs.load(Ordering::SeqCst);
            cx.batch(|| {
                a.set(100);
                b.set(200);
            });
            if synchronous {
                let reruns = runs.load(Ordering::SeqCst) - before;
                if adapter.batch().is_some() {
                    assert!(reruns <= 1, "{}: {reruns} reruns", adapter.name());
                } else {
                    assert_eq!(reruns, 2, "{}", adapter.name());
                }
                assert_eq!(seen.load(Ordering::SeqCst), 300, "{}", adapter.name());
            }
        }

        teardown(adapter).await;
    }
}

/// Only the runtime adapter wraps a library with native batching.
#[test]
fn native_batch_is_declared_where_it_exists() {
    let with_batch: Vec<_> = adapters::registry()
        .iter()
        .filter(|adapter| adapter.batch().is_some())
        .map(|adapter| adapter.name().to_string())
        .collect();
    assert_eq!(with_batch, vec![adapters::RuntimeAdapter::NAME]);
}

/// The runtime adapter's runtime lives from setup to teardown.
#[tokio::test]
async fn runtime_follows_lifecycle() {
    let runtime = adapters::RuntimeAdapter::new();
    runtime.setup().await.unwrap();
    assert!(runtime.has_runtime());
    assert!(runtime.capabilities().scoped);

    let count = runtime.signal(1);
    count.set(2);
    assert_eq!(count.get(), 2);
    drop(count);

    runtime.teardown().await.unwrap();
    assert!(!runtime.has_runtime());
    assert!(runtime.teardown().await.is_err());
}

/// Arena primitives need a root, which teardown releases.
#[tokio::test]
async fn arena_root_follows_lifecycle() {
    let arena = adapters::ArenaAdapter::new();
    arena.setup().await.unwrap();
    assert!(arena.has_root());
    assert!(arena.capabilities().scoped);

    let count = arena.signal(1);
    count.set(2);
    assert_eq!(count.get(), 2);
    drop(count);

    arena.teardown().await.unwrap();
    assert!(!arena.has_root());
}
