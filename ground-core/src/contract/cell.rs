//! Signal and computed handles.
//!
//! Every library exposes its own cell types. Adapters wrap them behind the
//! two object-safe traits in this module, and scenarios only ever see the
//! uniform [`Signal`] and [`Computed`] handles.
//!
//! # Reads
//!
//! - `get()` is a tracked read: inside a computed or an effect it records a
//!   dependency on the cell.
//! - `peek()` is an untracked read. Libraries without a native untracked
//!   read fall back to `get()` and the adapter declares
//!   [`PeekSupport::TrackedFallback`](super::PeekSupport::TrackedFallback).

use std::fmt;
use std::sync::Arc;

/// Payload stored in a cell.
///
/// Libraries compare values to skip redundant notifications, and the
/// harness hands cells across effect closures, so values must be clonable,
/// comparable and thread-safe.
pub trait Value: Clone + PartialEq + Send + Sync + 'static {}

impl<T> Value for T where T: Clone + PartialEq + Send + Sync + 'static {}

/// Derivation function handed to [`Framework::computed`](super::Framework::computed).
pub type ComputeFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// A library's writable cell.
pub trait SignalCell<T>: Send + Sync {
    fn get(&self) -> T;
    fn set(&self, value: T);
    fn peek(&self) -> T;
}

/// A library's derived cell.
pub trait ComputedCell<T>: Send + Sync {
    fn get(&self) -> T;
    fn peek(&self) -> T;
}

// ----------------------------------------------------------------------------
// Signal
// ----------------------------------------------------------------------------

/// A mutable reactive cell.
///
/// Cloning a `Signal` produces another handle to the same cell.
///
/// # Example
///
/// ```rust,ignore
/// let count = cx.signal(0);
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T> {
    cell: Arc<dyn SignalCell<T>>,
}

impl<T: 'static> Signal<T> {
    pub fn new(cell: impl SignalCell<T> + 'static) -> Self {
        Self {
            cell: Arc::new(cell),
        }
    }

    /// Tracked read.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Write a new value and notify dependents.
    pub fn set(&self, value: T) {
        self.cell.set(value);
    }

    /// Untracked read.
    pub fn peek(&self) -> T {
        self.cell.peek()
    }

    /// Write `f(current)` without tracking the read.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        let next = f(self.cell.peek());
        self.cell.set(next);
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.peek())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Computed
// ----------------------------------------------------------------------------

/// A read-only cell derived from other cells.
///
/// Whether it recomputes eagerly or on the next read is up to the library.
/// It never recomputes when none of its dependencies changed.
pub struct Computed<T> {
    cell: Arc<dyn ComputedCell<T>>,
}

impl<T: 'static> Computed<T> {
    pub fn new(cell: impl ComputedCell<T> + 'static) -> Self {
        Self {
            cell: Arc::new(cell),
        }
    }

    pub fn get(&self) -> T {
        self.cell.get()
    }

    pub fn peek(&self) -> T {
        self.cell.peek()
    }
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("value", &self.peek())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Plain<T>(Mutex<T>);

    impl<T: Value> SignalCell<T> for Plain<T> {
        fn get(&self) -> T {
            self.0.lock().clone()
        }

        fn set(&self, value: T) {
            *self.0.lock() = value;
        }

        fn peek(&self) -> T {
            self.0.lock().clone()
        }
    }

    #[test]
    fn clones_share_the_cell() {
        let a = Signal::new(Plain(Mutex::new(1)));
        let b = a.clone();

        b.set(7);
        assert_eq!(a.get(), 7);
    }

    #[test]
    fn update_reads_then_writes() {
        let count = Signal::new(Plain(Mutex::new(10)));
        count.update(|n| n + 5);
        assert_eq!(count.peek(), 15);
    }

    #[test]
    fn debug_shows_value() {
        let name = Signal::new(Plain(Mutex::new(String::from("ground"))));
        assert_eq!(format!("{name:?}"), "Signal { value: \"ground\" }");
    }
}
