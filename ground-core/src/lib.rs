//! Ground Core
//!
//! A testing ground for reactive signal libraries. One scenario script is
//! written against a small uniform surface (signal, computed, effect,
//! batch) and replayed against every registered library adapter, so their
//! behavior can be compared side by side.
//!
//! # Architecture
//!
//! - `contract`: the uniform surface and the [`Framework`](contract::Framework)
//!   descriptor every adapter implements
//! - `adapters`: adapters over `reactive_graph` and `leptos_reactive`
//! - `harness`: adapter registry, active slot, output capture and runner
//! - `scenario`: the scenario trait and the built-in scripts
//! - `config`: TOML configuration for the `ground` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use ground_core::adapters::{self, Adapter};
//! use ground_core::harness::{Runner, Scope};
//! use ground_core::scenario::scenario;
//!
//! let runner = Runner::new(adapters::registry());
//! let script = scenario("hello", |cx: &Scope<'_, Adapter>| {
//!     let count = cx.signal(1);
//!     cx.console().log(format!("count is {}", count.get()));
//!     Ok(())
//! });
//!
//! let report = runner.run(&script).await?;
//! println!("{report}");
//! ```

pub mod adapters;
pub mod config;
pub mod contract;
pub mod error;
pub mod harness;
pub mod scenario;
pub mod testing;

pub use error::{AdapterError, HarnessError};
