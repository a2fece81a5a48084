//! Checks the guarantees every adapter must give.
//!
//! Each check logs a `ok:` line when it holds and fails the scenario with an
//! assertion error when it does not. Checks that depend on a capability the
//! adapter declares missing are skipped with a `skip:` line, so a degrade
//! never counts as a failure:
//!
//! - untracked `peek` only when peek support is native
//! - effect rerun counts only when effects rerun synchronously
//! - batch coalescing only when the adapter exposes a native `batch`

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

use super::{expect_eq, Scenario, ScenarioResult};
use crate::contract::{Cleanup, EffectSupport, Framework, PeekSupport};
use crate::harness::{Console, Scope};

#[derive(Debug, Clone, Copy, Default)]
pub struct Conformance;

impl<F: Framework> Scenario<F> for Conformance {
    fn name(&self) -> &str {
        "conformance"
    }

    fn run(&self, cx: &Scope<'_, F>) -> ScenarioResult {
        let console = cx.console();
        console.log(format!("Checking {}", cx.adapter_name()));

        fresh_signal(cx)?;
        last_write_wins(cx)?;
        peek_does_not_track(cx)?;
        diamond(cx)?;
        conditional_dependencies(cx)?;
        effect_lifecycle(cx)?;
        batch_coalescing(cx)?;

        console.log("All checks passed");
        Ok(())
    }
}

fn ok(console: Console, check: &str) {
    console.log(format!("ok: {check}"));
}

fn skip(console: Console, check: &str, reason: &str) {
    console.log(format!("skip: {check} ({reason})"));
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

fn fresh_signal<F: Framework>(cx: &Scope<'_, F>) -> ScenarioResult {
    expect_eq("fresh i32 signal", cx.signal(42).get(), 42)?;
    expect_eq("fresh string signal", cx.signal(String::from("v")).get(), "v".to_string())?;
    expect_eq("fresh vec signal", cx.signal(vec![1, 2, 3]).get(), vec![1, 2, 3])?;
    ok(cx.console(), "fresh signal returns its initial value");
    Ok(())
}

fn last_write_wins<F: Framework>(cx: &Scope<'_, F>) -> ScenarioResult {
    let s = cx.signal(0);
    for value in [3, 1, 4, 1, 5] {
        s.set(value);
    }
    expect_eq("get after writes", s.get(), 5)?;
    expect_eq("peek after writes", s.peek(), 5)?;
    ok(cx.console(), "last write wins");
    Ok(())
}

fn peek_does_not_track<F: Framework>(cx: &Scope<'_, F>) -> ScenarioResult {
    const CHECK: &str = "peek does not track";
    if cx.adapter().capabilities().peek == PeekSupport::TrackedFallback {
        skip(cx.console(), CHECK, "peek is a tracked read");
        return Ok(());
    }

    let tracked = cx.signal(1);
    let peeked = cx.signal(10);
    let runs = counter();
    let total = {
        let (tracked, peeked, runs) = (tracked.clone(), peeked.clone(), runs.clone());
        cx.computed(move || {
            runs.fetch_add(1, Ordering::SeqCst);
            tracked.get() + peeked.peek()
        })
    };

    expect_eq("initial total", total.get(), 11)?;
    peeked.set(20);
    expect_eq("total after peeked write", total.get(), 11)?;
    expect_eq("recomputes after peeked write", count(&runs), 1)?;

    tracked.set(2);
    expect_eq("total after tracked write", total.get(), 22)?;
    expect_eq("recomputes after tracked write", count(&runs), 2)?;

    ok(cx.console(), CHECK);
    Ok(())
}

fn diamond<F: Framework>(cx: &Scope<'_, F>) -> ScenarioResult {
    let source = cx.signal(1);
    let left = {
        let source = source.clone();
        cx.computed(move || source.get() * 2)
    };
    let right = {
        let source = source.clone();
        cx.computed(move || source.get() + 1)
    };
    let joins = counter();
    let result = {
        let joins = joins.clone();
        cx.computed(move || {
            joins.fetch_add(1, Ordering::SeqCst);
            left.get() + right.get()
        })
    };

    expect_eq("diamond initial", result.get(), 4)?;
    source.set(2);
    expect_eq("diamond after update", result.get(), 7)?;
    expect_eq("diamond join evaluations", count(&joins), 2)?;
    ok(cx.console(), "diamond settles without glitches");
    Ok(())
}

fn conditional_dependencies<F: Framework>(cx: &Scope<'_, F>) -> ScenarioResult {
    let use_x = cx.signal(true);
    let x = cx.signal(10);
    let y = cx.signal(20);
    let runs = counter();
    let conditional = {
        let (use_x, x, y, runs) = (use_x.clone(), x.clone(), y.clone(), runs.clone());
        cx.computed(move || {
            runs.fetch_add(1, Ordering::SeqCst);
            if use_x.get() {
                x.get()
            } else {
                y.get()
            }
        })
    };

    expect_eq("conditional initial", conditional.get(), 10)?;
    let before = count(&runs);

    y.set(25);
    expect_eq("value after untracked y", conditional.get(), 10)?;
    expect_eq("recomputes after untracked y", count(&runs), before)?;

    x.set(15);
    expect_eq("value after tracked x", conditional.get(), 15)?;
    if count(&runs) <= before {
        return Err(super::ScenarioError::Assertion(
            "changing x did not recompute".to_string(),
        ));
    }

    use_x.set(false);
    expect_eq("value after switching", conditional.get(), 25)?;
    let switched = count(&runs);

    x.set(100);
    expect_eq("value after untracked x", conditional.get(), 25)?;
    expect_eq("recomputes after untracked x", count(&runs), switched)?;

    y.set(30);
    expect_eq("value after tracked y", conditional.get(), 30)?;
    if count(&runs) <= switched {
        return Err(super::ScenarioError::Assertion(
            "changing y did not recompute".to_string(),
        ));
    }

    ok(cx.console(), "conditional dependencies follow the branch");
    Ok(())
}

fn effect_lifecycle<F: Framework>(cx: &Scope<'_, F>) -> ScenarioResult {
    const CHECK: &str = "effect reruns and cleanup";
    let effects = cx.adapter().capabilities().effects;

    let s = cx.signal(0);
    let runs = counter();
    let cleanups = counter();
    let disposer = {
        let (s, runs, cleanups) = (s.clone(), runs.clone(), cleanups.clone());
        cx.effect(move || {
            s.get();
            runs.fetch_add(1, Ordering::SeqCst);
            let cleanups = cleanups.clone();
            Cleanup::callback(move || {
                cleanups.fetch_add(1, Ordering::SeqCst);
            })
        })
    };

    match effects {
        EffectSupport::Synchronous => {
            expect_eq("runs on creation", count(&runs), 1)?;
            s.set(1);
            expect_eq("runs after write", count(&runs), 2)?;
            expect_eq("cleanups before rerun", count(&cleanups), 1)?;
            ok(cx.console(), CHECK);
        }
        EffectSupport::DeferredReruns => {
            expect_eq("runs on creation", count(&runs), 1)?;
            skip(cx.console(), CHECK, "reruns are deferred");
        }
        EffectSupport::Unsupported => skip(cx.console(), CHECK, "effects never run"),
    }

    let settled = count(&runs);
    disposer.dispose();
    disposer.dispose();
    s.set(99);
    expect_eq("runs after dispose", count(&runs), settled)?;
    if effects != EffectSupport::Unsupported {
        expect_eq("cleanup after dispose", count(&cleanups), settled)?;
    }
    ok(cx.console(), "disposal is idempotent and final");
    Ok(())
}

fn batch_coalescing<F: Framework>(cx: &Scope<'_, F>) -> ScenarioResult {
    const CHECK: &str = "batch coalesces writes";
    if cx.adapter().capabilities().effects != EffectSupport::Synchronous {
        skip(cx.console(), CHECK, "effects do not rerun synchronously");
        return Ok(());
    }

    let a = cx.signal(1);
    let b = cx.signal(2);
    let sum = {
        let (a, b) = (a.clone(), b.clone());
        cx.computed(move || a.get() + b.get())
    };
    let runs = counter();
    let seen = Arc::new(AtomicI32::new(0));
    let disposer = {
        let (runs, seen) = (runs.clone(), seen.clone());
        cx.effect(move || {
            runs.fetch_add(1, Ordering::SeqCst);
            seen.store(sum.get(), Ordering::SeqCst);
        })
    };

    let before = count(&runs);
    a.set(10);
    b.set(20);
    expect_eq("reruns after separate writes", count(&runs) - before, 2)?;
    expect_eq("value after separate writes", seen.load(Ordering::SeqCst), 30)?;

    let before = count(&runs);
    cx.batch(|| {
        a.set(100);
        b.set(200);
    });
    let reruns = count(&runs) - before;
    expect_eq("value after batch", seen.load(Ordering::SeqCst), 300)?;

    if cx.adapter().batch().is_some() {
        if reruns > 1 {
            return Err(super::ScenarioError::Assertion(format!(
                "batched writes caused {reruns} reruns"
            )));
        }
        ok(cx.console(), CHECK);
    } else {
        skip(
            cx.console(),
            CHECK,
            &format!("no native batch, {reruns} reruns"),
        );
    }

    disposer.dispose();
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
