//! The uniform reactive contract.
//!
//! Every library under test is reduced to the same small surface:
//!
//! - [`Signal`]: mutable cell with tracked `get`, `set`, untracked `peek`
//! - [`Computed`]: derived read-only cell
//! - effects: side-effecting bodies that rerun on change, stopped through a
//!   [`Disposer`]
//! - batching: optional grouping of writes, see [`Batch`]
//!
//! Scenarios are written once against this surface and replayed against
//! each [`Framework`] in turn.

mod cell;
mod effect;
mod framework;

pub use cell::{ComputeFn, Computed, ComputedCell, Signal, SignalCell, Value};
pub use effect::{Cleanup, Disposer, EffectBody, EffectFn, EffectPhase};
pub use framework::{
    capability_gaps, Batch, Capabilities, CapabilityGap, EffectSupport, Framework, Gaps,
    PeekSupport,
};
