//! The starter script of the playground editor.

use super::{Scenario, ScenarioResult};
use crate::console_log;
use crate::contract::Framework;
use crate::harness::Scope;

#[derive(Debug, Clone, Copy, Default)]
pub struct Playground;

impl<F: Framework> Scenario<F> for Playground {
    fn name(&self) -> &str {
        "playground"
    }

    fn run(&self, cx: &Scope<'_, F>) -> ScenarioResult {
        let console = cx.console();
        console.log("Hello from signals playground!");

        let count = cx.signal(0);
        let doubled = {
            let count = count.clone();
            cx.computed(move || count.get() * 2)
        };

        {
            let count = count.clone();
            cx.effect(move || {
                console_log!(console, "Count:", count.get(), "Doubled:", doubled.get());
            });
        }

        count.set(1);
        count.set(2);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
