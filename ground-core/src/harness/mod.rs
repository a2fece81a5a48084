//! Harness plumbing: registry, active slot, output capture and the runner.

mod capture;
mod registry;
mod report;
mod runner;
mod slot;

pub use capture::{
    redirect, render_arg, CaptureGuard, CaptureLayer, Console, OutputCapture, SCENARIO_TARGET,
};
pub use registry::Registry;
pub use report::{Failure, RunReport, Stage, TestResult};
pub use runner::{RunOptions, Runner};
pub use slot::{ActiveSlot, Scope};
