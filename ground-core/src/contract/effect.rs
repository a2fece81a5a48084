//! Effect lifecycle shared by every adapter.
//!
//! Libraries disagree on how an effect's cleanup is modelled: some expect a
//! returned function, some register it through a callback, some have no
//! cleanup at all. Adapters hand the raw user body to an [`EffectBody`] and
//! let the library decide *when* to call [`EffectBody::run`]. The body takes
//! care of *what* happens around each run.
//!
//! # How Effect Bodies Work
//!
//! ```text
//!   NeverRun ──run──▶ ActiveWithCleanup ◀──run──┐
//!      │                 │        │             │
//!      │                 │       run ──▶ ActiveWithoutCleanup
//!      │              dispose               │
//!      └───dispose──▶ Disposed ◀──dispose───┘
//! ```
//!
//! 1. Before every rerun the cleanup returned by the previous run is invoked.
//! 2. `dispose()` invokes the pending cleanup once and parks the body in
//!    `Disposed`. Later runs are ignored, so a library that still delivers a
//!    queued notification after disposal cannot resurrect the effect.
//! 3. The state lock is never held while user code runs. A body disposed
//!    while it is running has its fresh cleanup invoked as soon as it returns.

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// What an effect body returns.
pub enum Cleanup {
    /// Nothing to undo.
    None,
    /// Invoked before the next run and on disposal.
    Callback(Box<dyn FnOnce() + Send + Sync>),
}

impl Cleanup {
    pub fn callback(f: impl FnOnce() + Send + Sync + 'static) -> Self {
        Cleanup::Callback(Box::new(f))
    }
}

impl From<()> for Cleanup {
    fn from(_: ()) -> Self {
        Cleanup::None
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cleanup::None => f.write_str("Cleanup::None"),
            Cleanup::Callback(_) => f.write_str("Cleanup::Callback(..)"),
        }
    }
}

/// Type-erased effect body as handed to adapters.
pub type EffectFn = Arc<dyn Fn() -> Cleanup + Send + Sync>;

/// Observable lifecycle phase of an [`EffectBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPhase {
    NeverRun,
    ActiveWithCleanup,
    ActiveWithoutCleanup,
    Disposed,
}

enum State {
    NeverRun,
    ActiveWithCleanup(Box<dyn FnOnce() + Send + Sync>),
    ActiveWithoutCleanup,
    Disposed,
}

impl State {
    fn phase(&self) -> EffectPhase {
        match self {
            State::NeverRun => EffectPhase::NeverRun,
            State::ActiveWithCleanup(_) => EffectPhase::ActiveWithCleanup,
            State::ActiveWithoutCleanup => EffectPhase::ActiveWithoutCleanup,
            State::Disposed => EffectPhase::Disposed,
        }
    }

    fn take_cleanup(&mut self) -> Option<Box<dyn FnOnce() + Send + Sync>> {
        match mem::replace(self, State::ActiveWithoutCleanup) {
            State::ActiveWithCleanup(cleanup) => Some(cleanup),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// An effect body plus its cleanup bookkeeping.
pub struct EffectBody {
    body: EffectFn,
    state: Mutex<State>,
    runs: AtomicUsize,
}

impl EffectBody {
    pub fn new(body: EffectFn) -> Self {
        Self {
            body,
            state: Mutex::new(State::NeverRun),
            runs: AtomicUsize::new(0),
        }
    }

    /// Run the body once.
    ///
    /// Returns `false` without running anything when the body is disposed.
    pub fn run(&self) -> bool {
        let previous = {
            let mut state = self.state.lock();
            if matches!(*state, State::Disposed) {
                return false;
            }
            state.take_cleanup()
        };
        if let Some(cleanup) = previous {
            cleanup();
        }

        let outcome = (self.body)();
        self.runs.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        if matches!(*state, State::Disposed) {
            drop(state);
            if let Cleanup::Callback(cleanup) = outcome {
                cleanup();
            }
            return true;
        }

        let next = match outcome {
            Cleanup::None => State::ActiveWithoutCleanup,
            Cleanup::Callback(cleanup) => State::ActiveWithCleanup(cleanup),
        };
        // A nested run may have installed a cleanup while this one was busy.
        let displaced = mem::replace(&mut *state, next);
        drop(state);
        if let State::ActiveWithCleanup(cleanup) = displaced {
            cleanup();
        }
        true
    }

    /// Stop the effect, invoking its pending cleanup. Idempotent.
    pub fn dispose(&self) {
        let previous = mem::replace(&mut *self.state.lock(), State::Disposed);
        if let State::ActiveWithCleanup(cleanup) = previous {
            cleanup();
        }
    }

    pub fn phase(&self) -> EffectPhase {
        self.state.lock().phase()
    }

    pub fn is_disposed(&self) -> bool {
        self.phase() == EffectPhase::Disposed
    }

    /// Number of completed runs.
    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for EffectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectBody")
            .field("phase", &self.phase())
            .field("run_count", &self.run_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Disposer
// ----------------------------------------------------------------------------

/// Handle that stops an effect.
///
/// Clones share the same effect. Only the first `dispose()` does anything.
#[derive(Clone)]
pub struct Disposer {
    action: Arc<Mutex<Option<Box<dyn FnOnce() + Send>>>>,
    disposed: Arc<AtomicBool>,
}

impl Disposer {
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Arc::new(Mutex::new(Some(Box::new(action)))),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A disposer with nothing behind it, for adapters whose effects never run.
    pub fn noop() -> Self {
        Self {
            action: Arc::new(Mutex::new(None)),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    fn counting_body(cleanups: Arc<AtomicI32>) -> EffectBody {
        EffectBody::new(Arc::new(move || {
            let cleanups = cleanups.clone();
            Cleanup::callback(move || {
                cleanups.fetch_add(1, Ordering::SeqCst);
            })
        }))
    }

    #[test]
    fn body_starts_never_run() {
        let body = EffectBody::new(Arc::new(|| Cleanup::None));
        assert_eq!(body.phase(), EffectPhase::NeverRun);
        assert_eq!(body.run_count(), 0);
    }

    #[test]
    fn cleanup_runs_before_each_rerun() {
        let cleanups = Arc::new(AtomicI32::new(0));
        let body = counting_body(cleanups.clone());

        body.run();
        assert_eq!(body.phase(), EffectPhase::ActiveWithCleanup);
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);

        body.run();
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);

        body.run();
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);
        assert_eq!(body.run_count(), 3);
    }

    #[test]
    fn body_without_cleanup_stays_without_cleanup() {
        let body = EffectBody::new(Arc::new(|| Cleanup::None));
        body.run();
        assert_eq!(body.phase(), EffectPhase::ActiveWithoutCleanup);
    }

    #[test]
    fn dispose_invokes_pending_cleanup_once() {
        let cleanups = Arc::new(AtomicI32::new(0));
        let body = counting_body(cleanups.clone());

        body.run();
        body.dispose();
        body.dispose();

        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        assert!(body.is_disposed());
    }

    #[test]
    fn disposed_body_ignores_runs() {
        let cleanups = Arc::new(AtomicI32::new(0));
        let body = counting_body(cleanups.clone());

        body.run();
        body.dispose();
        assert!(!body.run());
        assert_eq!(body.run_count(), 1);
    }

    #[test]
    fn dispose_during_run_invokes_fresh_cleanup() {
        let cleanups = Arc::new(AtomicI32::new(0));
        let slot: Arc<Mutex<Option<Arc<EffectBody>>>> = Arc::new(Mutex::new(None));

        let body = {
            let cleanups = cleanups.clone();
            let slot = slot.clone();
            Arc::new(EffectBody::new(Arc::new(move || {
                if let Some(me) = slot.lock().clone() {
                    me.dispose();
                }
                let cleanups = cleanups.clone();
                Cleanup::callback(move || {
                    cleanups.fetch_add(1, Ordering::SeqCst);
                })
            })))
        };
        *slot.lock() = Some(body.clone());

        body.run();
        assert_eq!(body.phase(), EffectPhase::Disposed);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disposer_is_idempotent() {
        let calls = Arc::new(AtomicI32::new(0));
        let disposer = {
            let calls = calls.clone();
            Disposer::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        let other = disposer.clone();

        disposer.dispose();
        other.dispose();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(other.is_disposed());
    }

    #[test]
    fn noop_disposer_can_be_disposed() {
        let disposer = Disposer::noop();
        assert!(!disposer.is_disposed());
        disposer.dispose();
        assert!(disposer.is_disposed());
    }
}
