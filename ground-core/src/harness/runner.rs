//! Cross-implementation runner.
//!
//! Replays one scenario against every adapter in a [`Registry`], strictly
//! one after another, and records a [`TestResult`] for each.
//!
//! # How a Turn Works
//!
//! For each adapter, in registration order:
//!
//! 1. Start the clock and open an empty output buffer.
//! 2. Await `setup()`. An error or panic marks the turn failed at
//!    [`Stage::Setup`] and skips the scenario, but teardown still runs.
//! 3. Install the adapter in the [`ActiveSlot`] and redirect scenario
//!    output into the buffer.
//! 4. Run the scenario inside `catch_unwind`. Errors and panics become a
//!    [`Failure`] at [`Stage::Scenario`].
//! 5. Drop the [`Scope`](super::Scope), disposing the scenario's effects.
//! 6. Await `teardown()`. A failure here is logged into the buffer as
//!    `Teardown error for <name>: ...` and never changes the verdict.
//! 7. Restore the previous output sink, clear the slot, stop the clock.
//!
//! One adapter failing never prevents the next one from running.
//!
//! # Threading
//!
//! Output capture is scoped to the current thread, so the runner must be
//! driven on a current-thread runtime (as `#[tokio::main(flavor =
//! "current_thread")]` and `#[tokio::test]` do).

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use futures_util::FutureExt;
use tracing::{debug, info, warn};

use super::capture::{self, Console, OutputCapture};
use super::registry::Registry;
use super::report::{Failure, RunReport, Stage, TestResult};
use super::slot::ActiveSlot;
use crate::contract::{capability_gaps, Framework};
use crate::error::{HarnessError, Result};
use crate::scenario::Scenario;

/// Knobs for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Also print scenario output to stderr while capturing it.
    pub echo: bool,
}

/// Runs scenarios across a registry of adapters.
#[derive(Debug)]
pub struct Runner<F> {
    registry: Registry<F>,
    options: RunOptions,
}

impl<F: Framework> Runner<F> {
    pub fn new(registry: Registry<F>) -> Self {
        Self {
            registry,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Registry<F> {
        &self.registry
    }

    /// Run `scenario` against every registered adapter.
    pub async fn run<S: Scenario<F>>(&self, scenario: &S) -> Result<RunReport> {
        if self.registry.is_empty() {
            return Err(HarnessError::EmptyRegistry);
        }

        info!(
            scenario = scenario.name(),
            adapters = self.registry.len(),
            "starting run"
        );

        let mut slot = ActiveSlot::new();
        let mut results = Vec::with_capacity(self.registry.len());
        for adapter in &self.registry {
            info!(adapter = adapter.name(), "testing adapter");
            let result = self.run_adapter(&mut slot, adapter, scenario).await;
            match &result.error {
                Some(error) => warn!(adapter = %result.adapter, %error, "adapter failed"),
                None => info!(
                    adapter = %result.adapter,
                    elapsed_ms = result.duration_ms(),
                    "adapter passed"
                ),
            }
            results.push(result);
        }

        Ok(RunReport::new(scenario.name(), results))
    }

    async fn run_adapter<'a, S: Scenario<F>>(
        &self,
        slot: &mut ActiveSlot<'a, F>,
        adapter: &'a F,
        scenario: &S,
    ) -> TestResult {
        let started = Instant::now();
        let output = OutputCapture::new();
        let name = adapter.name().to_string();

        let setup = match AssertUnwindSafe(adapter.setup()).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(Failure::from_error(Stage::Setup, &err)),
            Err(payload) => Err(Failure::new(Stage::Setup, panic_message(payload))),
        };

        let guard = capture::redirect(&output, self.options.echo);
        let verdict = match setup {
            Ok(()) => {
                slot.install(adapter);
                execute(slot, scenario)
            }
            Err(failure) => Err(failure),
        };

        debug!(adapter = %name, "tearing down");
        let teardown = match AssertUnwindSafe(adapter.teardown()).catch_unwind().await {
            Ok(result) => result.map_err(|err| err.to_string()),
            Err(payload) => Err(panic_message(payload)),
        };
        if let Err(message) = teardown {
            Console.error(format!("Teardown error for {name}: {message}"));
        }

        drop(guard);
        slot.clear();

        TestResult {
            adapter: name,
            success: verdict.is_ok(),
            duration: started.elapsed(),
            output: output.text(),
            error: verdict.err(),
            gaps: capability_gaps(adapter).into_vec(),
        }
    }
}

fn execute<F: Framework, S: Scenario<F>>(
    slot: &ActiveSlot<'_, F>,
    scenario: &S,
) -> std::result::Result<(), Failure> {
    let scope = slot
        .bind()
        .map_err(|err| Failure::from_error(Stage::Scenario, &err))?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| scenario.run(&scope)));
    drop(scope);

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Failure::from_error(Stage::Scenario, &err)),
        Err(payload) => Err(Failure::new(Stage::Scenario, panic_message(payload))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked with a non-string payload".to_string()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
