//! The default walkthrough script.
//!
//! Four small examples, each logging what it observes so the outputs of
//! different adapters can be compared line by line:
//!
//! - a counter with two derived values and an effect
//! - a diamond: one source, two branches, one join
//! - a computed whose dependencies change with a flag
//! - two writes made individually and then as one batch
//!
//! Nothing here asserts. Differences between libraries show up in the logs:
//! eager or lazy recomputation, native or inline batching, deferred effects,
//! and effects that rerun once per notification and briefly observe a
//! derived value before it has caught up.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Scenario, ScenarioResult};
use crate::contract::Framework;
use crate::harness::Scope;

#[derive(Debug, Clone, Copy, Default)]
pub struct Basics;

impl<F: Framework> Scenario<F> for Basics {
    fn name(&self) -> &str {
        "basics"
    }

    fn run(&self, cx: &Scope<'_, F>) -> ScenarioResult {
        let console = cx.console();
        console.log("Running signals test...");

        basic_counter(cx);
        diamond(cx);
        conditional_dependencies(cx);
        batching(cx);

        console.log("");
        console.log("Test completed!");
        Ok(())
    }
}

fn basic_counter<F: Framework>(cx: &Scope<'_, F>) {
    let console = cx.console();
    console.log("");
    console.log("Basic Counter Example:");

    let counter = cx.signal(0);
    let doubled = {
        let counter = counter.clone();
        cx.computed(move || counter.get() * 2)
    };
    let is_even = {
        let counter = counter.clone();
        cx.computed(move || counter.get() % 2 == 0)
    };

    let runs = Arc::new(AtomicUsize::new(0));
    let effect = {
        let counter = counter.clone();
        let runs = runs.clone();
        cx.effect(move || {
            runs.fetch_add(1, Ordering::SeqCst);
            console.log(format!(
                "  Counter: {}, Doubled: {}, Even: {}",
                counter.get(),
                doubled.get(),
                is_even.get()
            ));
        })
    };

    for value in 1..=4 {
        counter.set(value);
    }

    console.log(format!("  Effect ran {} times", runs.load(Ordering::SeqCst)));
    effect.dispose();
}

fn diamond<F: Framework>(cx: &Scope<'_, F>) {
    let console = cx.console();
    console.log("");
    console.log("Diamond Dependency Example:");

    let source = cx.signal(1);
    let left = {
        let source = source.clone();
        cx.computed(move || {
            console.log("  Computing left branch");
            source.get() * 2
        })
    };
    let right = {
        let source = source.clone();
        cx.computed(move || {
            console.log("  Computing right branch");
            source.get() + 1
        })
    };
    let result = cx.computed(move || {
        console.log("  Computing result");
        left.get() + right.get()
    });

    console.log(format!("  Initial result: {}", result.get()));

    console.log("  Updating source to 2...");
    source.set(2);
    console.log(format!("  New result: {}", result.get()));
}

fn conditional_dependencies<F: Framework>(cx: &Scope<'_, F>) {
    let console = cx.console();
    console.log("");
    console.log("Conditional Dependencies Example:");

    let use_x = cx.signal(true);
    let x = cx.signal(10);
    let y = cx.signal(20);

    let runs = Arc::new(AtomicUsize::new(0));
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

    let report = |label: &str| {
        let value = conditional.get();
        console.log(format!(
            "  {label}: {value}, compute runs: {}",
            runs.load(Ordering::SeqCst)
        ));
    };

    report("Initial");

    // Not a dependency while `use_x` is true.
    y.set(25);
    report("After y change");

    x.set(15);
    report("After x change");

    use_x.set(false);
    report("After switching to y");

    y.set(30);
    report("After y change");

    // No longer a dependency.
    x.set(100);
    report("After x change");
}

fn batching<F: Framework>(cx: &Scope<'_, F>) {
    let console = cx.console();
    console.log("");
    console.log("Batching Example:");

    let a = cx.signal(1);
    let b = cx.signal(2);
    let sum = {
        let (a, b) = (a.clone(), b.clone());
        cx.computed(move || a.get() + b.get())
    };

    let runs = Arc::new(AtomicUsize::new(0));
    let effect = {
        let runs = runs.clone();
        cx.effect(move || {
            runs.fetch_add(1, Ordering::SeqCst);
            console.log(format!("  Sum: {}", sum.get()));
        })
    };

    console.log("  Individual updates:");
    a.set(5);
    b.set(10);
    console.log(format!("  Effect ran {} times", runs.load(Ordering::SeqCst)));

    runs.store(0, Ordering::SeqCst);

    console.log("  Batched updates:");
    cx.batch(|| {
        a.set(20);
        b.set(30);
    });
    console.log(format!(
        "  Effect ran {} times (should be 1 if batching works)",
        runs.load(Ordering::SeqCst)
    ));

    effect.dispose();
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
